use masnaa_cli::seeder::{self, AdminAccount};
use masnaa_config::DatabaseConfig;
use masnaa_db::PgPool;
use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Password};
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "masnaa-cli")]
#[command(about = "Masnaa CLI - Administrative tools for the Masnaa ERP", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Synchronise the permission catalog and default roles (safe to re-run)
    Seed,
    /// Create an administrator account
    CreateAdmin {
        /// Display name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Insert fake suppliers for local development
    SeedDemo {
        /// Number of suppliers to create
        #[arg(short = 's', long, default_value = "20")]
        suppliers: usize,
    },
    /// Delete every purchase order and reset order numbering
    ClearPurchaseOrders {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    masnaa_observability::basic_logging::init_basic_console_logging();

    let cli = Cli::parse();

    let config = match DatabaseConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let pool = match masnaa_db::connect(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Commands::Migrate => handle_migrate(&pool).await,
        Commands::Seed => handle_seed(&pool).await,
        Commands::CreateAdmin {
            name,
            email,
            password,
        } => handle_create_admin(&pool, name, email, password).await,
        Commands::SeedDemo { suppliers } => handle_seed_demo(&pool, suppliers).await,
        Commands::ClearPurchaseOrders { yes } => handle_clear_purchase_orders(&pool, yes).await,
    }

    masnaa_db::close(&pool).await;
}

fn fail(context: &str, error: impl std::fmt::Display) -> ! {
    eprintln!("\n❌ Error {}: {}", context, error);
    std::process::exit(1);
}

fn prompt_text(prompt: &str) -> String {
    match Input::<String>::new().with_prompt(prompt).interact_text() {
        Ok(value) => value,
        Err(e) => fail("reading input", e),
    }
}

async fn handle_migrate(pool: &PgPool) {
    match masnaa_db::run_migrations(pool).await {
        Ok(()) => println!("✅ Migrations applied"),
        Err(e) => fail("running migrations", e),
    }
}

async fn handle_seed(pool: &PgPool) {
    match seeder::seed_rbac(pool).await {
        Ok(report) => {
            println!(
                "✅ Permission catalog synced ({} entries, {} removed)",
                report.permissions_synced, report.permissions_removed
            );
            if report.roles_applied {
                println!(
                    "✅ Default roles applied (version {})",
                    seeder::ROLES_SEED_VERSION
                );
            } else {
                println!("   Default roles already up to date");
            }
        }
        Err(e) => fail("seeding database", e),
    }
}

async fn handle_create_admin(
    pool: &PgPool,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) {
    let name = name.unwrap_or_else(|| prompt_text("Name"));
    let email = email.unwrap_or_else(|| prompt_text("Email address"));
    let password = password.unwrap_or_else(|| {
        match Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
        {
            Ok(password) => password,
            Err(e) => fail("reading password", e),
        }
    });

    let account = AdminAccount {
        name,
        email,
        password,
    };

    match seeder::create_admin(pool, &account).await {
        Ok(id) => {
            println!("\n✅ Admin account created successfully!");
            println!("   ID: {}", id);
            println!("   Email: {}", account.email.trim().to_lowercase());
            println!("   Name: {}", account.name.trim());
        }
        Err(e) => fail("creating admin", e),
    }
}

async fn handle_seed_demo(pool: &PgPool, suppliers: usize) {
    match seeder::seed_demo_suppliers(pool, suppliers).await {
        Ok(inserted) => println!("✅ Created {} suppliers", inserted),
        Err(e) => fail("seeding suppliers", e),
    }
}

async fn handle_clear_purchase_orders(pool: &PgPool, yes: bool) {
    if !yes {
        let confirmed = match Confirm::new()
            .with_prompt("Delete ALL purchase orders and reset numbering?")
            .default(false)
            .interact()
        {
            Ok(confirmed) => confirmed,
            Err(e) => fail("reading confirmation", e),
        };
        if !confirmed {
            println!("Aborted");
            return;
        }
    }

    match seeder::clear_purchase_orders(pool).await {
        Ok(deleted) => println!("✅ Deleted {} purchase orders", deleted),
        Err(e) => fail("clearing purchase orders", e),
    }
}
