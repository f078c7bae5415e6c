use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database schema and id sequences (safe to re-run)
    Init {
        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },

    /// Issue an access token for the root account and print it once
    IssueToken {
        /// Token name prefix; the unix timestamp is appended
        prefix: String,

        /// Comma-separated scopes, e.g. "api,write_repository"
        scopes: String,

        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },

    /// Move id sequences past the highest existing ids
    FixSequences {
        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },

    /// Ensure the root namespace and account exist and reset the root password
    SetupRoot {
        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// File holding the initial root password, used when ROOTSTRAP_PASSWORD is unset
        #[arg(long, default_value = crate::config::DEFAULT_PASSWORD_FILE)]
        password_file: String,
    },

    /// Check that the root account's namespace can be found (read-only)
    VerifyNamespace {
        /// Data directory holding the database
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}
