//! Describe command - print the event registration

use crate::cli::style::Stylize;
use anstream::println;
use bb_release::EVENT;

/// Print the static event description
pub fn run_describe() {
    println!("{} {}", EVENT.name.emphasis(), EVENT.version.muted());
    println!("  trigger: {}", EVENT.trigger.accent());
    println!("  answer:  {}", EVENT.answer);
    println!();
    println!("{}", EVENT.help);
}
