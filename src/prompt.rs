//! Terminal menu and prompt layer.
//!
//! Thin wrappers over a `BufRead` so sessions are drivable from tests;
//! the parsing itself lives in pure helpers. `None` from any reader means
//! stdin hit EOF and the caller should wind down.

use std::io::{self, BufRead, Write};

/// Width of the banner rule.
const BANNER_WIDTH: usize = 60;

/// Clear the terminal and print the program banner.
pub fn banner(title: &str) {
    // ANSI: clear screen, cursor home.
    print!("\x1b[2J\x1b[H");
    println!("{}", "=".repeat(BANNER_WIDTH));
    println!("{title:^width$}", width = BANNER_WIDTH);
    println!("{}", "=".repeat(BANNER_WIDTH));
}

/// Show a numbered menu and read a validated selection (0-based).
///
/// Re-prompts until the operator enters a number in range.
pub fn choose(
    question: &str,
    options: &[&str],
    input: &mut impl BufRead,
) -> io::Result<Option<usize>> {
    loop {
        println!("\n{question}");
        for (i, option) in options.iter().enumerate() {
            println!("{}. {option}", i + 1);
        }
        let Some(line) = read_line("\nEnter your choice (number): ", input)? else {
            return Ok(None);
        };
        match parse_choice(&line, options.len()) {
            Some(idx) => return Ok(Some(idx)),
            None => eprintln!("Please enter a number between 1 and {}.", options.len()),
        }
    }
}

/// Parse a 1-based menu selection against `len` options.
fn parse_choice(input: &str, len: usize) -> Option<usize> {
    match input.trim().parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Some(n - 1),
        _ => None,
    }
}

/// Free-text host prompt.
pub fn read_host(input: &mut impl BufRead) -> io::Result<Option<String>> {
    read_line("Server IP address: ", input)
}

/// Read the peer port, re-prompting until it parses as an integer.
pub fn read_port(input: &mut impl BufRead) -> io::Result<Option<u16>> {
    loop {
        let Some(line) = read_line("Server port number: ", input)? else {
            return Ok(None);
        };
        match parse_port(&line) {
            Some(port) => return Ok(Some(port)),
            None => eprintln!("Please enter a valid port number (integer)."),
        }
    }
}

fn parse_port(input: &str) -> Option<u16> {
    input.trim().parse::<u16>().ok()
}

/// Prompt for one message line.
pub fn read_message(input: &mut impl BufRead) -> io::Result<Option<String>> {
    read_line("\nInput text to scramble: ", input)
}

/// `quit` in any casing ends a client session.
pub fn is_quit(message: &str) -> bool {
    message.trim().eq_ignore_ascii_case("quit")
}

/// y/n confirmation; anything but `y`/`yes` (or EOF) declines.
pub fn confirm(question: &str, input: &mut impl BufRead) -> io::Result<bool> {
    let Some(line) = read_line(question, input)? else {
        return Ok(false);
    };
    let answer = line.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Print `prompt` without a newline, flush, and read one line.
pub fn read_line(prompt: &str, input: &mut impl BufRead) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
