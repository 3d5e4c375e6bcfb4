/// Track files into a manifest
pub mod add;
/// Shared registry loading and saving for commands
pub mod context;
/// Package tracked files as archives
pub mod pack;
/// Print a placement plan for a run directory
pub mod plan;
/// Move a manifest onto new source roots
pub mod rebase;
/// List manifest contents
pub mod show;
/// Restore archives on another machine
pub mod unpack;
