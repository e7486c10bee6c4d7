//! Interactive prompts for choosing and editing channels and branches.
//!
//! All functions read from any `BufRead` and write to any `Write` so they can
//! run against stdin/stdout or in-memory buffers. End of input cancels.

use std::io::{self, BufRead, Write};

use crate::settings::{BranchChange, ChannelRegistry};

/// Print a prompt and read one trimmed line. `None` on end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    message: &str,
) -> io::Result<Option<String>> {
    write!(out, "{}", message)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(out)?;
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Offer `(key, label)` options and return the chosen key.
///
/// Accepts the 1-based index or the key itself (case-insensitive). An empty
/// answer or end of input returns `None`.
fn choose<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    title: &str,
    options: &[(String, String)],
) -> io::Result<Option<String>> {
    if options.is_empty() {
        writeln!(out, "Nothing to choose from.")?;
        return Ok(None);
    }

    writeln!(out, "{}:", title)?;
    for (i, (key, label)) in options.iter().enumerate() {
        writeln!(out, "  {}. {} ({})", i + 1, label, key)?;
    }

    loop {
        let Some(answer) = prompt(input, out, "> ")? else {
            return Ok(None);
        };
        if answer.is_empty() {
            return Ok(None);
        }
        if let Ok(index) = answer.parse::<usize>() {
            if (1..=options.len()).contains(&index) {
                return Ok(Some(options[index - 1].0.clone()));
            }
        }
        if let Some((key, _)) = options.iter().find(|(k, _)| k.eq_ignore_ascii_case(&answer)) {
            return Ok(Some(key.clone()));
        }
        writeln!(out, "Invalid choice '{}'", answer)?;
    }
}

fn channel_options(registry: &ChannelRegistry) -> Vec<(String, String)> {
    registry
        .iter()
        .map(|(key, channel)| (key.clone(), channel.name.clone()))
        .collect()
}

fn branch_options(registry: &ChannelRegistry, key: &str) -> Vec<(String, String)> {
    registry
        .get(key)
        .map(|channel| {
            channel
                .branches
                .iter()
                .map(|(code, name)| (code.clone(), name.clone()))
                .collect()
        })
        .unwrap_or_default()
}

/// Print every channel with its branches.
pub fn print_channels<W: Write>(out: &mut W, registry: &ChannelRegistry) -> io::Result<()> {
    if registry.is_empty() {
        writeln!(out, "No channels configured.")?;
        return Ok(());
    }
    writeln!(out, "Channels:")?;
    for (key, channel) in registry.iter() {
        writeln!(out, "  {} ({})", channel.name, key)?;
        for (code, name) in &channel.branches {
            writeln!(out, "    {:<5} {}", code, name)?;
        }
    }
    Ok(())
}

/// Ask for a channel (unless `channel` is given) and then a branch.
pub fn select_channel_branch<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    registry: &ChannelRegistry,
    channel: Option<&str>,
) -> io::Result<Option<(String, String)>> {
    let key = match channel {
        Some(key) => key.to_string(),
        None => match choose(input, out, "Select channel", &channel_options(registry))? {
            Some(key) => key,
            None => return Ok(None),
        },
    };
    if registry.get(&key).is_none() {
        writeln!(out, "Unknown channel '{}'", key)?;
        return Ok(None);
    }

    let branch = choose(
        input,
        out,
        &format!("Select branch of {}", registry.channel_name(&key)),
        &branch_options(registry, &key),
    )?;
    Ok(branch.map(|code| (key, code)))
}

/// Run the management menu until the user is done.
///
/// Returns true when the registry was modified and should be saved.
pub fn management_menu<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    registry: &mut ChannelRegistry,
) -> io::Result<bool> {
    let mut modified = false;
    loop {
        writeln!(out)?;
        writeln!(out, "Channel management:")?;
        writeln!(out, "  1. List channels")?;
        writeln!(out, "  2. Add channel")?;
        writeln!(out, "  3. Add or rename branch")?;
        writeln!(out, "  4. Remove branch")?;
        writeln!(out, "  5. Remove channel")?;
        writeln!(out, "  0. Done")?;

        let Some(choice) = prompt(input, out, "> ")? else {
            return Ok(modified);
        };
        match choice.as_str() {
            "1" => print_channels(out, registry)?,
            "2" => modified |= add_channel(input, out, registry)?,
            "3" => modified |= add_branch(input, out, registry)?,
            "4" => modified |= remove_branch(input, out, registry)?,
            "5" => modified |= remove_channel(input, out, registry)?,
            "0" | "" | "q" => return Ok(modified),
            other => writeln!(out, "Invalid choice '{}'", other)?,
        }
    }
}

fn add_channel<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    registry: &mut ChannelRegistry,
) -> io::Result<bool> {
    let Some(key) = prompt(input, out, "Channel key (e.g. baemin): ")? else {
        return Ok(false);
    };
    let key = key.to_lowercase();
    if key.is_empty() {
        return Ok(false);
    }
    let Some(name) = prompt(input, out, "Display name: ")? else {
        return Ok(false);
    };
    let name = if name.is_empty() { key.clone() } else { name };
    let Some(copy_from) = prompt(input, out, "Copy branches from (empty: first channel): ")? else {
        return Ok(false);
    };
    let copy_from = Some(copy_from.as_str()).filter(|s| !s.is_empty());

    match registry.add_channel(&key, &name, copy_from) {
        Ok(channel) => {
            writeln!(
                out,
                "Added {} ({}) with {} branches",
                channel.name,
                key,
                channel.branches.len()
            )?;
            Ok(true)
        }
        Err(e) => {
            writeln!(out, "{}", e)?;
            Ok(false)
        }
    }
}

fn add_branch<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    registry: &mut ChannelRegistry,
) -> io::Result<bool> {
    let Some(key) = choose(input, out, "Channel", &channel_options(registry))? else {
        return Ok(false);
    };
    let Some(code) = prompt(input, out, "Branch code (e.g. BC): ")? else {
        return Ok(false);
    };
    let code = code.to_uppercase();
    if code.is_empty() {
        return Ok(false);
    }
    let Some(name) = prompt(input, out, "Branch name: ")? else {
        return Ok(false);
    };
    if name.is_empty() {
        return Ok(false);
    }

    match registry.add_branch(&key, &code, &name) {
        Ok(BranchChange::Added) => {
            writeln!(out, "Added branch {} ({})", code, name)?;
            Ok(true)
        }
        Ok(BranchChange::Renamed { previous }) => {
            writeln!(out, "Renamed branch {}: {} -> {}", code, previous, name)?;
            Ok(true)
        }
        Ok(BranchChange::Unchanged) => {
            writeln!(out, "Branch {} unchanged", code)?;
            Ok(false)
        }
        Err(e) => {
            writeln!(out, "{}", e)?;
            Ok(false)
        }
    }
}

fn remove_branch<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    registry: &mut ChannelRegistry,
) -> io::Result<bool> {
    let Some((key, code)) = select_channel_branch(input, out, registry, None)? else {
        return Ok(false);
    };
    match registry.remove_branch(&key, &code) {
        Ok(name) => {
            writeln!(out, "Removed branch {} ({})", code, name)?;
            Ok(true)
        }
        Err(e) => {
            writeln!(out, "{}", e)?;
            Ok(false)
        }
    }
}

fn remove_channel<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    registry: &mut ChannelRegistry,
) -> io::Result<bool> {
    let Some(key) = choose(input, out, "Channel", &channel_options(registry))? else {
        return Ok(false);
    };
    let question = format!("Remove {} and all its branches? [y/N] ", registry.channel_name(&key));
    let Some(answer) = prompt(input, out, &question)? else {
        return Ok(false);
    };
    if !answer.eq_ignore_ascii_case("y") {
        return Ok(false);
    }
    match registry.remove_channel(&key) {
        Ok(channel) => {
            writeln!(out, "Removed channel {}", channel.name)?;
            Ok(true)
        }
        Err(e) => {
            writeln!(out, "{}", e)?;
            Ok(false)
        }
    }
}
