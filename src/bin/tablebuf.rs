//! tablebuf CLI: inspect the root table of a binary buffer.

#[cfg(feature = "fast-alloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::io::{IsTerminal, Read};
use std::process;
use tablebuf::{Table, FILE_IDENTIFIER_LENGTH};

#[derive(Parser)]
#[command(name = "tablebuf", about = "Inspect FlatBuffers-style binary tables")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print root table position, vtable and field offsets
    Inspect(InspectArgs),
}

#[derive(Args)]
struct InspectArgs {
    /// Input file (- for stdin)
    #[arg(short, long)]
    input: String,

    /// Emit a JSON object instead of text
    #[arg(long)]
    json: bool,

    /// Expected 4-byte file identifier after the root offset
    #[arg(long, value_parser = parse_identifier)]
    identifier: Option<[u8; FILE_IDENTIFIER_LENGTH]>,
}

fn parse_identifier(s: &str) -> Result<[u8; FILE_IDENTIFIER_LENGTH], String> {
    <[u8; FILE_IDENTIFIER_LENGTH]>::try_from(s.as_bytes())
        .map_err(|_| format!("identifier must be exactly {FILE_IDENTIFIER_LENGTH} bytes, got {}", s.len()))
}

/// Layout der Root-Tabelle, wie sie ausgegeben wird.
#[derive(Debug, PartialEq)]
struct RootLayout {
    buffer_len: usize,
    identifier: Option<String>,
    table: usize,
    vtable: usize,
    vtable_size: usize,
    object_size: usize,
    /// Feld-Offsets relativ zur Tabelle, 0 = nicht vorhanden.
    fields: Vec<u16>,
}

fn inspect(data: &[u8], identifier: Option<&[u8; FILE_IDENTIFIER_LENGTH]>) -> tablebuf::Result<RootLayout> {
    let table = match identifier {
        Some(ident) => Table::open_with_identifier(data, ident)?,
        None => Table::open(data, 0)?,
    };
    let vtable = table.vtable();
    Ok(RootLayout {
        buffer_len: data.len(),
        identifier: identifier.map(|ident| String::from_utf8_lossy(ident).into_owned()),
        table: table.position(),
        vtable: vtable.position(),
        vtable_size: vtable.byte_len(),
        object_size: vtable.object_size(),
        fields: (0..vtable.num_fields()).map(|slot| vtable.offset_of(slot)).collect(),
    })
}

fn render_text(layout: &RootLayout) -> String {
    let mut out = format!("buffer:     {} bytes\n", layout.buffer_len);
    if let Some(ident) = &layout.identifier {
        out.push_str(&format!("identifier: {ident}\n"));
    }
    out.push_str(&format!("table:      at {}, {} bytes\n", layout.table, layout.object_size));
    out.push_str(&format!("vtable:     at {}, {} bytes\n", layout.vtable, layout.vtable_size));
    for (slot, offset) in layout.fields.iter().enumerate() {
        match offset {
            0 => out.push_str(&format!("slot {slot:<5} absent\n")),
            off => out.push_str(&format!("slot {slot:<5} +{off}\n")),
        }
    }
    out
}

fn render_json(layout: &RootLayout) -> serde_json::Value {
    json!({
        "buffer_len": layout.buffer_len,
        "identifier": layout.identifier,
        "table": layout.table,
        "vtable": layout.vtable,
        "vtable_size": layout.vtable_size,
        "object_size": layout.object_size,
        "fields": layout.fields,
    })
}

/// Liest den ganzen Buffer aus einer Datei oder (`-`) von stdin.
fn read_input(path: &str) -> Result<Vec<u8>, String> {
    if path != "-" {
        return std::fs::read(path).map_err(|e| format!("Buffer '{path}' nicht lesbar: {e}"));
    }
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprintln!("Erwarte Binaerdaten auf stdin (Ctrl+D beendet die Eingabe)");
    }
    let mut data = Vec::new();
    stdin
        .read_to_end(&mut data)
        .map_err(|e| format!("Buffer von stdin nicht lesbar: {e}"))?;
    Ok(data)
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Fehler: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Inspect(args) => run_inspect(args),
    }
}

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    let data = read_input(&args.input)?;
    let layout = inspect(&data, args.identifier.as_ref()).map_err(|e| e.to_string())?;
    if args.json {
        let text = serde_json::to_string_pretty(&render_json(&layout))
            .map_err(|e| format!("JSON-Fehler: {e}"))?;
        println!("{text}");
    } else {
        print!("{}", render_text(&layout));
    }
    Ok(())
}
