use crate::core::resolver::Resolver;
use anyhow::{Context, Result};
use clap::Args;

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Ignore a key in the Secretfile (repeatable)
    #[arg(long, short = 'i', value_name = "KEY")]
    pub ignore: Vec<String>,
}

/// Resolve every non-ignored manifest key and print `export KEY=VALUE`
/// lines suitable for `source`-ing in a shell.
///
/// Ignored keys are filtered before resolution so they cost no backend
/// reads. Output is buffered until every key has resolved: on any failure
/// nothing is printed, so a shell never sources a half-resolved set.
pub fn run(resolver: &mut Resolver, args: ReadArgs) -> Result<()> {
    let mut lines = Vec::new();

    for key in resolver.keys()? {
        if args.ignore.contains(&key) {
            continue;
        }
        let value = resolver.get(&key)?;
        lines.push(format!("export {}={}", key, quote(&value.to_string())?));
    }

    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn quote(value: &str) -> Result<String> {
    let quoted = shlex::try_quote(value).context("value not representable in shell")?;
    Ok(quoted.into_owned())
}
