use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "siakad")]
#[command(about = "Student directory and session management", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Optional record fields shared by `add` and `edit`.
#[derive(Args, Debug, Default)]
pub struct OptionalFields {
    /// Entry year, digits only (non-digits are dropped)
    #[arg(long)]
    pub angkatan: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    /// Phone number
    #[arg(long)]
    pub telepon: Option<String>,

    /// Address
    #[arg(long)]
    pub alamat: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a student
    #[command(alias = "n")]
    Add {
        /// Student number
        nim: String,

        /// Full name
        nama: String,

        /// Study program (see `siakad programs`)
        jurusan: String,

        #[command(flatten)]
        fields: OptionalFields,
    },

    /// Update fields of a student
    #[command(alias = "e")]
    Edit {
        /// Student id or unique id prefix
        id: String,

        #[arg(long)]
        nim: Option<String>,

        #[arg(long)]
        nama: Option<String>,

        #[arg(long)]
        jurusan: Option<String>,

        #[command(flatten)]
        fields: OptionalFields,
    },

    /// Delete a student
    #[command(alias = "delete")]
    Rm {
        /// Student id or unique id prefix
        id: String,
    },

    /// Show one student
    #[command(alias = "v")]
    Show {
        /// Student id or unique id prefix
        id: String,
    },

    /// List students, newest first
    #[command(alias = "ls")]
    List,

    /// Find students whose name starts with a prefix (case-sensitive)
    #[command(alias = "s")]
    Search {
        prefix: String,
    },

    /// List the known study programs
    Programs,

    /// Create an account and sign in
    Register {
        nama: String,
        email: String,
        password: String,
        confirm_password: String,
    },

    /// Sign in
    Login {
        /// Email; defaults to the remembered one
        email: Option<String>,

        /// Password; defaults to the remembered one
        password: Option<String>,

        /// Remember the credential on this device
        #[arg(long)]
        remember: bool,
    },

    /// Sign out and clear the session cache
    Logout,

    /// Show the signed-in user
    Whoami,
}
