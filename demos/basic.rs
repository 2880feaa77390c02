use sqlgate_http::{decoder, Connection, Query, Statement, Value};

#[derive(Clone, Debug)]
struct User {
    id: i64,
    name: String,
    email: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::var("SQLGATE_URL")?;
    let user = std::env::var("SQLGATE_USER")?;
    let password = std::env::var("SQLGATE_PASSWORD")?;

    let db = Connection::new(url)
        .with_auth(user, password)
        .with_log_file("sqlgate-requests.log");

    db.execute(&Statement::new(
        "CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT)",
        [],
    ))
    .await?;

    db.execute(&Statement::new(
        "INSERT INTO users (name, email) VALUES (:name, :email)",
        [Value::string("name", "Kit"), Value::nullable("email", None::<String>)],
    ))
    .await?;

    let users = Query::new(
        "SELECT id, name, email FROM users WHERE name = :name",
        [Value::string("name", "Kit")],
        decoder::get3(
            decoder::int("id"),
            decoder::string("name"),
            decoder::nullable("email", decoder::kind::string()),
            |id, name, email| User { id, name, email },
        ),
    );

    for user in db.get_all(&users).await? {
        println!("{} {} {:?}", user.id, user.name, user.email);
    }

    Ok(())
}
