use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "farmsync")]
#[command(about = "Manage farmers, crops, farm types, and users from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to the local mirror database
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// API base URL (e.g. http://127.0.0.1:8000/api)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Work from the local mirror without contacting the server
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session locally
    Login {
        /// Account username
        #[arg(long, short)]
        username: String,
        /// Account password (read from stdin when omitted)
        #[arg(long, short)]
        password: Option<String>,
    },
    /// Renew the access token with the stored refresh token
    Refresh,
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Show connectivity, session, and local mirror state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage farm types
    #[command(name = "farm-types", alias = "farm-type")]
    FarmTypes {
        #[command(subcommand)]
        command: FarmTypeCommands,
    },
    /// Manage crops
    #[command(alias = "crop")]
    Crops {
        #[command(subcommand)]
        command: CropCommands,
    },
    /// Manage farmers
    #[command(alias = "farmer")]
    Farmers {
        #[command(subcommand)]
        command: FarmerCommands,
    },
    /// Manage back-office users
    #[command(alias = "user")]
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Show or change stored CLI settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ShowArgs {
    /// Record id (numeric, or local-<uuid> for records created offline)
    pub id: String,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct UpdateArgs {
    /// Record id
    pub id: String,
    /// Field to change, repeatable (e.g. --set name=Dairy)
    #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
    pub assignments: Vec<String>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct DeleteArgs {
    /// Record id
    pub id: String,
}

#[derive(Subcommand)]
pub enum FarmTypeCommands {
    /// List farm types
    List(ListArgs),
    /// Show one farm type
    Show(ShowArgs),
    /// Create a farm type
    Add {
        /// Farm type name
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Change fields of a farm type
    Update(UpdateArgs),
    /// Delete a farm type
    Delete(DeleteArgs),
}

#[derive(Subcommand)]
pub enum CropCommands {
    /// List crops
    List(ListArgs),
    /// Show one crop
    Show(ShowArgs),
    /// Create a crop
    Add {
        /// Crop name
        name: String,
        /// Crop category
        #[arg(long = "type", value_name = "TYPE")]
        crop_type: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        /// Image file to attach
        #[arg(long, value_name = "PATH")]
        image: Option<PathBuf>,
    },
    /// Change fields of a crop
    Update(UpdateArgs),
    /// Delete a crop
    Delete(DeleteArgs),
}

#[derive(Subcommand)]
pub enum FarmerCommands {
    /// List farmers
    List(ListArgs),
    /// Show one farmer
    Show(ShowArgs),
    /// Register a farmer
    Add {
        /// Full name
        name: String,
        #[arg(long)]
        national_id: String,
        #[arg(long, default_value = "")]
        location: String,
        /// Farm type id
        #[arg(long, value_name = "ID")]
        farm_type: String,
        /// Crop id
        #[arg(long, value_name = "ID")]
        crop: String,
    },
    /// Change fields of a farmer
    Update(UpdateArgs),
    /// Delete a farmer
    Delete(DeleteArgs),
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List users
    List(ListArgs),
    /// Show one user
    Show(ShowArgs),
    /// Create a user
    Add {
        username: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long, value_enum, default_value_t = RoleArg::Clerk)]
        role: RoleArg,
        /// Initial password
        #[arg(long)]
        password: Option<String>,
    },
    /// Change fields of a user
    Update(UpdateArgs),
    /// Delete a user
    Delete(DeleteArgs),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print resolved settings and where each comes from
    Show,
    /// Store a setting in the CLI config file
    Set {
        #[arg(value_enum)]
        key: SettingKey,
        value: String,
    },
    /// Remove a stored setting
    Unset {
        #[arg(value_enum)]
        key: SettingKey,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SettingKey {
    ApiBaseUrl,
    DbPath,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum RoleArg {
    Clerk,
    Admin,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
