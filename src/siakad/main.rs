use clap::Parser;
use directories::ProjectDirs;
use siakad::api::SiakadApi;
use siakad::auth::LocalAuthProvider;
use siakad::config::SiakadConfig;
use siakad::error::{Result, SiakadError};
use siakad::kv::fs::FileKeyValueStore;
use siakad::model::{Program, Registration, StudentInput, StudentPatch};
use siakad::store::fs::FileDocumentStore;
use siakad::validation::sanitize_angkatan;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod args;
mod print;

use args::{Cli, Commands, OptionalFields};

type App = SiakadApi<FileDocumentStore, FileKeyValueStore, LocalAuthProvider<FileDocumentStore>>;

struct AppContext {
    api: App,
    config: SiakadConfig,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let ctx = init_context(&cli)?;

    match cli.command {
        Commands::Add {
            nim,
            nama,
            jurusan,
            fields,
        } => handle_add(&ctx, nim, nama, jurusan, fields).await,
        Commands::Edit {
            id,
            nim,
            nama,
            jurusan,
            fields,
        } => {
            let patch = StudentPatch {
                nim,
                nama,
                jurusan,
                angkatan: fields.angkatan.as_deref().map(sanitize_angkatan),
                email: fields.email,
                telepon: fields.telepon,
                alamat: fields.alamat,
            };
            handle_edit(&ctx, &id, patch).await
        }
        Commands::Rm { id } => handle_remove(&ctx, &id).await,
        Commands::Show { id } => handle_show(&ctx, &id).await,
        Commands::List => handle_list(&ctx).await,
        Commands::Search { prefix } => handle_search(&ctx, &prefix).await,
        Commands::Programs => {
            for program in Program::ALL {
                println!("{}", program);
            }
            Ok(())
        }
        Commands::Register {
            nama,
            email,
            password,
            confirm_password,
        } => {
            let registration = Registration {
                nama,
                email,
                password,
                confirm_password,
            };
            handle_register(&ctx, &registration).await
        }
        Commands::Login {
            email,
            password,
            remember,
        } => handle_login(&ctx, email, password, remember).await,
        Commands::Logout => handle_logout(&ctx).await,
        Commands::Whoami => handle_whoami(&ctx).await,
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let proj_dirs = ProjectDirs::from("id", "siakad", "siakad");
    let config = SiakadConfig::load(proj_dirs.as_ref().map(|d| d.config_dir()))?;

    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| SiakadError::Config(format!("invalid log level `{}`: {}", level, e)))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let data_dir = match (&config.data_dir, &proj_dirs) {
        (Some(dir), _) => dir.clone(),
        (None, Some(dirs)) => dirs.data_dir().to_path_buf(),
        (None, None) => {
            return Err(SiakadError::Config(
                "Could not determine data dir; set SIAKAD_DATA_DIR".to_string(),
            ))
        }
    };
    let db_dir: PathBuf = data_dir.join("db");

    let api = SiakadApi::new(
        FileDocumentStore::new(db_dir.clone()),
        FileKeyValueStore::new(data_dir.join("session.json")),
        LocalAuthProvider::new(FileDocumentStore::new(db_dir)),
    );
    Ok(AppContext { api, config })
}

async fn handle_add(
    ctx: &AppContext,
    nim: String,
    nama: String,
    jurusan: String,
    fields: OptionalFields,
) -> Result<()> {
    let input = StudentInput {
        nim,
        nama,
        jurusan,
        angkatan: fields.angkatan.as_deref().map(sanitize_angkatan),
        email: fields.email,
        telepon: fields.telepon,
        alamat: fields.alamat,
    };
    let id = ctx.api.add_student(&input).await?;
    print::print_success(&format!("Data mahasiswa berhasil ditambahkan ({})", id));
    Ok(())
}

async fn handle_edit(ctx: &AppContext, key: &str, patch: StudentPatch) -> Result<()> {
    let id = ctx.api.resolve_student(key).await?;
    ctx.api.edit_student(&id, &patch).await?;
    print::print_success("Data mahasiswa berhasil diupdate");
    Ok(())
}

async fn handle_remove(ctx: &AppContext, key: &str) -> Result<()> {
    let id = ctx.api.resolve_student(key).await?;
    ctx.api.remove_student(&id).await?;
    print::print_success("Data mahasiswa berhasil dihapus");
    Ok(())
}

async fn handle_show(ctx: &AppContext, key: &str) -> Result<()> {
    let id = ctx.api.resolve_student(key).await?;
    let student = ctx.api.student(&id).await?;
    print::print_student(&student);
    Ok(())
}

async fn handle_list(ctx: &AppContext) -> Result<()> {
    let students = ctx.api.list_students().await?;
    print::print_students(&students);
    Ok(())
}

async fn handle_search(ctx: &AppContext, prefix: &str) -> Result<()> {
    let students = ctx.api.search_students(prefix).await?;
    print::print_students(&students);
    Ok(())
}

async fn handle_register(ctx: &AppContext, registration: &Registration) -> Result<()> {
    let identity = ctx.api.register(registration).await?;
    print::print_success("Akun Anda berhasil dibuat!");
    print::print_identity(&identity);
    Ok(())
}

async fn handle_login(
    ctx: &AppContext,
    email: Option<String>,
    password: Option<String>,
    remember: bool,
) -> Result<()> {
    let (email, password) = match (email, password) {
        (Some(email), Some(password)) => (email, password),
        (email, password) => {
            let remembered = ctx.api.remembered_credential().await?;
            (
                email.or(remembered.email).unwrap_or_default(),
                password.or(remembered.password).unwrap_or_default(),
            )
        }
    };
    let remember = remember || ctx.config.remember_me;

    let identity = ctx.api.sign_in(&email, &password, remember).await?;
    print::print_success("Login berhasil");
    print::print_identity(&identity);
    Ok(())
}

async fn handle_logout(ctx: &AppContext) -> Result<()> {
    ctx.api.sign_out().await?;
    print::print_info("Logged out.");
    Ok(())
}

async fn handle_whoami(ctx: &AppContext) -> Result<()> {
    match ctx.api.current_identity().await? {
        Some(identity) => print::print_identity(&identity),
        None => print::print_info("Not signed in."),
    }
    Ok(())
}
