//! Database seeder for Veritax development and testing.
//!
//! Seeds a demo user and prints a ready-to-use bearer token for
//! exercising the document endpoints with curl or an HTTP client.
//!
//! Usage: cargo run --bin seeder

use veritax_core::auth::hash_password;
use veritax_db::UserRepository;
use veritax_shared::{AppConfig, JwtConfig, JwtService};

/// Demo account email (consistent for all seeds)
const DEMO_EMAIL: &str = "demo@veritax.dev";
/// Demo account password
const DEMO_PASSWORD: &str = "password123";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().expect("Failed to load configuration");

    println!("Connecting to database...");
    let db = veritax_db::connect(&config.database)
        .await
        .expect("Failed to connect to database");

    println!("Seeding demo user...");
    let users = UserRepository::new(db);
    seed_demo_user(&users).await;

    print_access_token(&config);

    println!("Seeding complete!");
}

/// Seeds the demo user unless it already exists.
async fn seed_demo_user(users: &UserRepository) {
    match users.email_exists(DEMO_EMAIL).await {
        Ok(true) => {
            println!("  Demo user already exists, skipping...");
            return;
        }
        Ok(false) => {}
        Err(e) => {
            eprintln!("Failed to check for demo user: {e}");
            return;
        }
    }

    let password_hash = hash_password(DEMO_PASSWORD).expect("Failed to hash demo password");

    match users.create(DEMO_EMAIL, &password_hash, "Demo User").await {
        Ok(user) => println!("  Created demo user: {}", user.email),
        Err(e) => eprintln!("Failed to insert demo user: {e}"),
    }
}

/// Prints a bearer token for the demo user.
fn print_access_token(config: &AppConfig) {
    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expiry_secs: config.jwt.access_token_expiry_secs,
    });

    match jwt_service.generate_access_token(DEMO_EMAIL) {
        Ok(token) => {
            println!(
                "  Bearer token for {DEMO_EMAIL} (expires in {}s):",
                jwt_service.access_token_expires_in()
            );
            println!("  {token}");
        }
        Err(e) => eprintln!("Failed to generate access token: {e}"),
    }
}
