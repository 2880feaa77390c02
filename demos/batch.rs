use sqlgate_http::{decoder, Connection, Decoder, Query, SqlGateError, Statement, Value};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let db = Connection::from_env().map_err(anyhow::Error::msg)?;

    let counts = db
        .transaction(&[
            Statement::new(
                "CREATE TABLE IF NOT EXISTS stock (sku TEXT PRIMARY KEY, qty INTEGER NOT NULL)",
                [],
            ),
            Statement::new(
                "INSERT INTO stock (sku, qty) VALUES (:sku, :qty)",
                [Value::string("sku", "A-1"), Value::int("qty", 5)],
            ),
            Statement::new(
                "INSERT INTO stock (sku, qty) VALUES (:sku, :qty)",
                [Value::string("sku", "B-2"), Value::int("qty", 0)],
            ),
        ])
        .await?;
    println!("rows updated per statement: {counts:?}");

    let in_stock = decoder::get2(decoder::string("sku"), decoder::int("qty"), |sku, qty| {
        (sku, qty)
    })
    .and_then(|(sku, qty)| {
        if qty > 0 {
            Decoder::succeed(sku)
        } else {
            Decoder::fail(format!("{sku} is out of stock"))
        }
    });

    let query = Query::new(
        "SELECT sku, qty FROM stock WHERE sku = :sku",
        [Value::string("sku", "B-2")],
        in_stock,
    );
    match db.get_maybe_one(&query).await {
        Ok(sku) => println!("in stock: {sku:?}"),
        Err(SqlGateError::Decode(err)) => eprintln!("rejected: {err}"),
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
