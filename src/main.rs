use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process;

use audiomark::host::VaultWorkspace;
use audiomark::{open_audio_picker, render_note_html, scan_markers, MarkerBinding, Settings};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: audiomark [--config <settings.yaml>] render <note.md> [output.html]
       audiomark [--config <settings.yaml>] markers <note.md>
       audiomark [--config <settings.yaml>] refs <note.md> [--vault <dir>]";

fn usage() -> ! {
    eprintln!("{}", USAGE);
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    // Parse flags
    let config_path = take_flag(&mut args, "--config");
    let vault_path = take_flag(&mut args, "--vault");

    let settings = match config_path {
        Some(path) => match Settings::load(Path::new(&path)) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => Settings::default(),
    };

    let (command, note_path) = match (args.first(), args.get(1)) {
        (Some(command), Some(note)) => (command.as_str(), note.as_str()),
        _ => usage(),
    };

    match command {
        "render" => render(note_path, args.get(2)),
        "markers" => markers(note_path),
        "refs" => refs(note_path, vault_path, &settings),
        _ => usage(),
    }
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let index = args.iter().position(|a| a == flag)?;
    if index + 1 >= args.len() {
        eprintln!("Missing value for {}", flag);
        usage();
    }
    let value = args.remove(index + 1);
    args.remove(index);
    Some(value)
}

fn read_note(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path, e);
            process::exit(1);
        }
    }
}

fn render(note_path: &str, output_path: Option<&String>) {
    let html = render_note_html(&read_note(note_path));

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &html) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
            eprintln!("Wrote HTML to {}", path);
        }
        None => println!("{}", html),
    }
}

fn markers(note_path: &str) {
    let source = read_note(note_path);
    let bindings: Vec<MarkerBinding> = scan_markers(&source).into_iter().map(|t| t.binding).collect();
    print_json(&bindings);
}

fn refs(note_path: &str, vault_path: Option<String>, settings: &Settings) {
    let note = PathBuf::from(note_path);
    // Without --vault, the note's own folder is the vault
    let vault = match vault_path {
        Some(dir) => PathBuf::from(dir),
        None => match note.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        },
    };
    let inside = if vault == Path::new(".") && note.is_relative() {
        Some(note.as_path())
    } else {
        note.strip_prefix(&vault).ok()
    };

    let relative = match inside {
        Some(rel) => rel
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/"),
        None => {
            eprintln!("Note '{}' is not inside vault '{}'", note.display(), vault.display());
            process::exit(1);
        }
    };

    let workspace = VaultWorkspace::new(vault).with_active_note(relative);
    match open_audio_picker(&workspace, &settings.audio_extension) {
        Some(references) => print_json(&references),
        None => process::exit(1),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}
