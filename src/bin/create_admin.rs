//! CLI tool to create, reset or deactivate administrator accounts.
//!
//! Usage:
//!   cargo run --bin create-admin -- --email ana@example.gob.pe --first-names "Ana" \
//!       --last-names "Quispe Rojas" --role supervisor --password '<password>'
//!   cargo run --bin create-admin -- --email ana@example.gob.pe --deactivate
//!
//! The password may also be passed in `MPV_ADMIN_PASSWORD` to keep it out of
//! shell history.

use std::env;

use mesa_partes_lib::config::Config;
use mesa_partes_lib::db::DbPool;
use mesa_partes_lib::db::administrators::NewAdministrator;
use mesa_partes_lib::models::AdminRole;
use mesa_partes_lib::services::admin_auth;
use validator::ValidateEmail;

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn next_value(args: &[String], i: &mut usize) -> Option<String> {
    *i += 1;
    args.get(*i).cloned()
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    let mut email: Option<String> = None;
    let mut first_names: Option<String> = None;
    let mut last_names: Option<String> = None;
    let mut role = "operador".to_string();
    let mut password: Option<String> = env::var("MPV_ADMIN_PASSWORD").ok();
    let mut deactivate = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--email" | "-e" => email = next_value(&args, &mut i),
            "--first-names" | "-f" => first_names = next_value(&args, &mut i),
            "--last-names" | "-l" => last_names = next_value(&args, &mut i),
            "--role" | "-r" => {
                if let Some(r) = next_value(&args, &mut i) {
                    role = r;
                }
            }
            "--password" | "-p" => password = next_value(&args, &mut i),
            "--deactivate" => deactivate = true,
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let email = match email {
        Some(e) if e.validate_email() => e.trim().to_lowercase(),
        Some(e) => fail(&format!("'{}' is not a valid email address", e)),
        None => {
            print_usage();
            fail("--email is required");
        }
    };

    let config = Config::from_env().unwrap_or_else(|e| fail(&format!("loading config: {}", e)));
    let pool = DbPool::new(&config.database)
        .await
        .unwrap_or_else(|e| fail(&format!("connecting to database: {}", e)));
    if let Err(e) = pool.run_migrations().await {
        fail(&format!("running migrations: {}", e));
    }

    if deactivate {
        let admin = match pool.get_admin_by_email(&email).await {
            Ok(Some(admin)) => admin,
            Ok(None) => fail(&format!("no administrator with email {}", email)),
            Err(e) => fail(&e.to_string()),
        };
        if let Err(e) = pool.set_admin_active(admin.id, false).await {
            fail(&e.to_string());
        }
        println!("Administrator {} deactivated", email);
        return;
    }

    let Some(role) = AdminRole::parse(&role) else {
        fail(&format!(
            "invalid role '{}'. Must be: operador, supervisor, admin",
            role
        ));
    };
    let first_names = first_names
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| fail("--first-names is required"));
    let last_names = last_names
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| fail("--last-names is required"));
    let password =
        password.unwrap_or_else(|| fail("--password or MPV_ADMIN_PASSWORD is required"));
    if let Err(message) = admin_auth::validate_password_strength(&password) {
        fail(&message);
    }

    let password_hash =
        admin_auth::hash_password(&password).unwrap_or_else(|e| fail(&e.to_string()));

    let admin = pool
        .upsert_admin(NewAdministrator {
            email,
            password_hash,
            first_names: first_names.trim().to_string(),
            last_names: last_names.trim().to_string(),
            role,
        })
        .await
        .unwrap_or_else(|e| fail(&e.to_string()));

    println!();
    println!("  Administrator ready");
    println!();
    println!("  ID:     {}", admin.id);
    println!("  Email:  {}", admin.email);
    println!("  Name:   {} {}", admin.first_names, admin.last_names);
    println!("  Role:   {}", admin.role);
    println!();
}

fn print_usage() {
    eprintln!(
        r#"
Usage: create-admin --email <EMAIL> [OPTIONS]

Options:
  -e, --email <EMAIL>          Administrator email (required)
  -f, --first-names <NAMES>    First names (required unless --deactivate)
  -l, --last-names <NAMES>     Last names (required unless --deactivate)
  -r, --role <ROLE>            operador, supervisor or admin (default: operador)
  -p, --password <PASSWORD>    Password, at least 10 characters
                               (or set MPV_ADMIN_PASSWORD)
      --deactivate             Disable the account instead of creating it
  -h, --help                   Show this help message

An existing account with the same email gets the new names, role and
password and is re-activated.
"#
    );
}
