//! Basic example of Sanduq DI container.

use sanduq::prelude::*;
use std::sync::Arc;

// === Define your types ===

struct ConsoleLogger {
    prefix: String,
}

impl ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[{}] {msg}", self.prefix);
    }
}

struct Database {
    url: String,
    logger: Arc<ConsoleLogger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.url)
    }
}

struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    fn find_user(&self, id: i64) -> String {
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

fn main() -> Result<()> {
    // Initialize tracing (logging)
    tracing_subscriber::fmt()
        .with_env_filter("sanduq_container=debug")
        .init();

    let container = Container::builder()
        // Logger — positional argument with a fallback
        .component(Component::of::<ConsoleLogger>().constructor(
            Signature::new().value("prefix"),
            |args| Ok(ConsoleLogger { prefix: args.str(0).unwrap_or("LOG").to_string() }),
        ))
        // Database — url from the caller, logger auto-wired
        .component(Component::named::<Database>("db").constructor(
            Signature::new().value("url").inject::<ConsoleLogger>("logger"),
            |args| {
                Ok(Database {
                    url: args.str(0).unwrap_or("sqlite::memory:").to_string(),
                    logger: args.instance(1)?,
                })
            },
        ))
        // UserRepository — method with an auto-wired parameter
        .component(
            Component::named::<UserRepository>("users")
                .constructor(Signature::new().inject_id("db", "db"), |args| {
                    Ok(UserRepository { db: args.instance(0)? })
                })
                .method("find", Signature::new().value("id"), |repo, args| {
                    Ok(repo.find_user(args.int(0).unwrap_or(1)))
                }),
        )
        .alias("database", "db")
        .bind("db", "db", args!["postgres://localhost/myapp"], false)
        .build()?;

    tracing::info!(container = ?container, "Example container ready");
    println!("✅ Container built successfully!");

    // === Resolve through an alias; the binding supplies the url ===
    let db = container.make_as::<Database>("database", vec![], false)?;
    println!("📋 Database: {}", db.url);

    // === Singletons: the same instance every time ===
    let again = container.make_as::<Database>("db", vec![], false)?;
    println!("🔁 Same instance: {}", Arc::ptr_eq(&db, &again));

    // === Invoke a method; the repository is resolved and cached ===
    let user = container.invoke_method_as::<String>("users", "find", args![42], false, vec![])?;
    tracing::info!(user = %user, "Invoked users.find");
    println!("👤 {user}");

    // === Renew: a fresh logger that is not cached ===
    let logger = Identifier::of::<ConsoleLogger>();
    let fresh = container.make_as::<ConsoleLogger>(logger.clone(), args!["FRESH"], true)?;
    fresh.log("renewed");
    println!("🗑️  Logger cached: {}", container.has(logger));

    println!("\n🎉 Everything works!");
    Ok(())
}
