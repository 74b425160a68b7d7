use std::sync::Arc;

use classhub_cli::admin::create_admin;
use classhub_cli::seeder::{self, SeedConfig};
use classhub_db::{PgStore, Store, init_db_pool};
use classhub_roster::RosterService;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "classhub-cli")]
#[command(about = "Classhub CLI - Administrative tools for Classhub", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new administrator account
    CreateAdmin {
        /// Full name of the admin
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with fake teachers, courses, classrooms and students
    Seed {
        /// Number of teachers
        #[arg(long, default_value = "5")]
        teachers: usize,

        /// Number of courses
        #[arg(long, default_value = "4")]
        courses: usize,

        /// Number of classrooms per course
        #[arg(long, default_value = "2")]
        classrooms: usize,

        /// Number of students per classroom
        #[arg(long, default_value = "20")]
        students: usize,

        /// Number of students left without a classroom
        #[arg(long, default_value = "10")]
        unassigned: usize,
    },
    /// Clear all seeded data (keeps accounts created by hand)
    ClearSeed,
}

fn prompt_text(prompt: &str) -> String {
    match Input::<String>::new().with_prompt(prompt).interact_text() {
        Ok(value) => value,
        Err(e) => {
            eprintln!("❌ Failed to read {}: {}", prompt.to_lowercase(), e);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let pool = match init_db_pool().await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };
    let pg = PgStore::new(pool);
    if let Err(e) = pg.migrate().await {
        eprintln!("❌ Failed to run migrations: {}", e);
        std::process::exit(1);
    }
    let store: Arc<dyn Store> = Arc::new(pg);
    let roster = RosterService::new(store.clone());

    match cli.command {
        Commands::CreateAdmin {
            name,
            email,
            password,
        } => handle_create_admin(store.as_ref(), name, email, password).await,
        Commands::Seed {
            teachers,
            courses,
            classrooms,
            students,
            unassigned,
        } => {
            let config = SeedConfig {
                teachers,
                courses,
                classrooms_per_course: classrooms,
                students_per_classroom: students,
                unassigned_students: unassigned,
                ..SeedConfig::default()
            };
            if let Err(e) = seeder::seed_all(store.as_ref(), &roster, config).await {
                eprintln!("\n❌ Error seeding database: {}", e);
                std::process::exit(1);
            }
        }
        Commands::ClearSeed => {
            if let Err(e) = seeder::clear_all(store.as_ref(), &roster).await {
                eprintln!("\n❌ Error clearing seeded data: {}", e);
                std::process::exit(1);
            }
        }
    }
}

async fn handle_create_admin(
    store: &dyn Store,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) {
    let name = name.unwrap_or_else(|| prompt_text("Full name"));
    let email = email.unwrap_or_else(|| prompt_text("Email address"));
    let password = match password {
        Some(password) => password,
        None => match Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
        {
            Ok(password) => password,
            Err(e) => {
                eprintln!("❌ Failed to read password: {}", e);
                std::process::exit(1);
            }
        },
    };

    match create_admin(store, &name, &email, &password).await {
        Ok(user) => {
            println!("\n✅ Admin created successfully!");
            println!("   Email: {}", user.email);
            println!("   Name: {}", user.name);
        }
        Err(e) => {
            eprintln!("\n❌ Error creating admin: {}", e);
            std::process::exit(1);
        }
    }
}
