use crate::core::resolver::Resolver;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Logical key to resolve
    pub key: String,

    /// Value to print when the key is not resolvable anywhere
    #[arg(long, value_name = "VALUE")]
    pub default: Option<String>,
}

/// Resolve one key through the full tiered lookup and print its value.
pub fn run(resolver: &mut Resolver, args: GetArgs) -> Result<()> {
    let value = match args.default {
        Some(default) => resolver.get_or(&args.key, default)?,
        None => resolver.get(&args.key)?,
    };
    println!("{value}");
    Ok(())
}
