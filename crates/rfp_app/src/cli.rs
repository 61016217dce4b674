use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "rfp")]
#[command(version, about = "Terminal workbench for the RFP processing service", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./rfp.ron when present)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Service base URL, overriding the configuration file
    #[arg(long, value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload an RFP document and watch processing until it settles
    Upload {
        /// Document to upload
        file: PathBuf,
    },

    /// List the RFPs the service knows about
    List,

    /// Poll in-progress uploads, or one RFP's artifacts, until none is processing
    Watch {
        /// RFP whose artifacts to watch
        #[arg(long, requires = "kind")]
        rfp: Option<String>,

        /// Artifact type, e.g. `requirements`
        #[arg(long, requires = "rfp")]
        kind: Option<String>,
    },

    /// Chat with the analyzer about one RFP (reads questions from stdin)
    Chat {
        rfp: String,
    },

    /// Review extracted requirements section by section (copilot mode)
    Review {
        rfp: String,
    },

    /// Run autonomous extraction over every section and follow its progress (agent mode)
    Extract {
        rfp: String,
    },

    /// Generate a response to one confirmed requirement
    Respond {
        rfp: String,

        /// Requirement number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        index: usize,

        /// Extra guidance for the writer
        #[arg(long, value_name = "TEXT")]
        instruction: Option<String>,

        /// Write the response as Markdown into the export directory
        #[arg(long)]
        export: bool,
    },
}
