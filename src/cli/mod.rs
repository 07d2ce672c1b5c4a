//! CLI surface for entra-port-sync.

pub mod sync;

use clap::{Parser, Subcommand};

/// Invite the members of a Microsoft Entra ID group to Port
#[derive(Parser)]
#[command(name = "entra-port-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve a group and send Port invites for its transitive members
    Sync(sync::SyncArgs),
}
