use futures::executor::block_on;
use mindweave::render::{InteractionEvent, NodeCommand, SvgRenderOptions};
use mindweave::{
    EditOutcome, IdGenerator, MindmapConfig, MindmapSession, SequentialIdGenerator, SessionError,
    UuidIdGenerator,
};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Session(SessionError),
    Json(serde_json::Error),
    /// The edit was valid input but the mutation engine declined it.
    NotApplied(EditOutcome),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Session(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::NotApplied(outcome) => write!(f, "edit not applied: {outcome:?}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<SessionError> for CliError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Ingest,
    Layout,
    Render,
    Outline,
    Edit(EditOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditOp {
    Add,
    Rename,
    Delete,
    Move,
    Unpin,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    strategy: Option<String>,
    config: Option<String>,
    id_prefix: Option<String>,
    viewport_width: Option<f64>,
    viewport_height: Option<f64>,
    diagram_id: Option<String>,
    select: Option<String>,
    node: Option<String>,
    text: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
    out: Option<String>,
}

fn usage() -> &'static str {
    "mindweave-cli\n\
\n\
USAGE:\n\
  mindweave-cli [ingest] [--pretty] [--id-prefix <p>] [<path>|-]\n\
  mindweave-cli layout [--pretty] [--strategy hierarchical|radial] [--config <json>] [<path>|-]\n\
  mindweave-cli render [--strategy hierarchical|radial] [--config <json>] [--viewport-width <w>] [--viewport-height <h>] [--select <id>] [--id <diagram-id>] [--out <path>] [<path>|-]\n\
  mindweave-cli outline [<path>|-]\n\
  mindweave-cli edit add --node <parent-id> --text <text> [<path>|-]\n\
  mindweave-cli edit rename --node <id> --text <text> [<path>|-]\n\
  mindweave-cli edit delete --node <id> [<path>|-]\n\
  mindweave-cli edit move --node <id> --x <x> --y <y> [<path>|-]\n\
  mindweave-cli edit unpin --node <id> [<path>|-]\n\
\n\
NOTES:\n\
  - Input is a JSON concept tree (`[root]`); if <path> is omitted or '-', it is read from stdin.\n\
  - Nodes without ids get one: `<prefix>-<n>` with --id-prefix, otherwise a random uuid.\n\
  - edit prints the updated tree; a declined edit exits with status 4.\n\
  - render prints SVG to stdout by default; use --out to write a file. With a viewport size the\n\
    view is fitted to the content and off-screen nodes are culled.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn next_f64<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<f64, CliError> {
    let v = next_value(it)?
        .parse::<f64>()
        .map_err(|_| CliError::Usage(usage()))?;
    if !v.is_finite() {
        return Err(CliError::Usage(usage()));
    }
    Ok(v)
}

fn parse_edit_op(op: &str) -> Result<EditOp, CliError> {
    match op {
        "add" => Ok(EditOp::Add),
        "rename" => Ok(EditOp::Rename),
        "delete" => Ok(EditOp::Delete),
        "move" => Ok(EditOp::Move),
        "unpin" => Ok(EditOp::Unpin),
        _ => Err(CliError::Usage(usage())),
    }
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "ingest" => args.command = Command::Ingest,
            "layout" => args.command = Command::Layout,
            "render" => args.command = Command::Render,
            "outline" => args.command = Command::Outline,
            "edit" => args.command = Command::Edit(parse_edit_op(next_value(&mut it)?)?),
            "--pretty" => args.pretty = true,
            "--strategy" => args.strategy = Some(next_value(&mut it)?.clone()),
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--id-prefix" => args.id_prefix = Some(next_value(&mut it)?.clone()),
            "--viewport-width" => args.viewport_width = Some(next_f64(&mut it)?),
            "--viewport-height" => args.viewport_height = Some(next_f64(&mut it)?),
            "--id" => args.diagram_id = Some(next_value(&mut it)?.clone()),
            "--select" => args.select = Some(next_value(&mut it)?.clone()),
            "--node" => args.node = Some(next_value(&mut it)?.clone()),
            "--text" => args.text = Some(next_value(&mut it)?.clone()),
            "--x" => args.x = Some(next_f64(&mut it)?),
            "--y" => args.y = Some(next_f64(&mut it)?),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" if args.input.is_none() => args.input = Some("-".to_string()),
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn load_config(args: &Args) -> Result<MindmapConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let overrides: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            MindmapConfig::with_overrides(&overrides)
        }
        None => MindmapConfig::default(),
    };
    if let Some(strategy) = &args.strategy {
        config.set_value("layout.strategy", Value::String(strategy.clone()));
    }
    Ok(config)
}

fn id_generator(args: &Args) -> Box<dyn IdGenerator + Send> {
    match &args.id_prefix {
        Some(prefix) => Box::new(SequentialIdGenerator::new(prefix.clone())),
        None => Box::new(UuidIdGenerator),
    }
}

fn open_session(args: &Args) -> Result<MindmapSession, CliError> {
    let mut session = MindmapSession::new(load_config(args)?)?.with_id_generator(id_generator(args));
    let input = args.input.clone();
    // The input stream stands in for the concept generator: nothing is loaded unless reading
    // and validation both succeed.
    block_on(session.ingest_generated(async move { read_input(input.as_deref()) }))?;
    Ok(session)
}

fn edit_command(op: EditOp, args: &Args) -> Result<NodeCommand, CliError> {
    let id = args.node.clone().ok_or(CliError::Usage(usage()))?;
    let text = || args.text.clone().ok_or(CliError::Usage(usage()));
    Ok(match op {
        EditOp::Add => NodeCommand::AddChild {
            parent: id,
            text: text()?,
        },
        EditOp::Rename => NodeCommand::Rename { id, text: text()? },
        EditOp::Delete => NodeCommand::Delete { id },
        EditOp::Move => {
            let (Some(x), Some(y)) = (args.x, args.y) else {
                return Err(CliError::Usage(usage()));
            };
            NodeCommand::Reposition { id, x, y }
        }
        EditOp::Unpin => NodeCommand::ClearPosition { id },
    })
}

fn run(args: Args) -> Result<(), CliError> {
    // Validate edit flags before touching stdin.
    let edit = match args.command {
        Command::Edit(op) => Some(edit_command(op, &args)?),
        _ => None,
    };
    let mut session = open_session(&args)?;

    match args.command {
        Command::Ingest => {
            let text = session.to_json_string(args.pretty)?;
            println!("{text}");
            Ok(())
        }
        Command::Layout => write_json(session.layout(), args.pretty),
        Command::Outline => write_text(&session.outline_markdown(), args.out.as_deref()),
        Command::Render => {
            if let Some(id) = &args.select {
                session.handle(InteractionEvent::ClickNode(id.clone()));
            }
            let viewport = match (args.viewport_width, args.viewport_height) {
                (None, None) => None,
                (w, h) => {
                    session.resize(w.unwrap_or(800.0), h.unwrap_or(600.0));
                    session.fit_view();
                    Some(session.viewport().clone())
                }
            };
            let options = SvgRenderOptions {
                diagram_id: args.diagram_id.clone(),
                viewport,
                ..Default::default()
            };
            write_text(&session.render_svg_with(&options), args.out.as_deref())
        }
        Command::Edit(_) => {
            let Some(command) = edit else {
                return Err(CliError::Usage(usage()));
            };
            // Structural edits are exposed only on the selected node.
            session.handle(InteractionEvent::ClickNode(command.target().to_string()));
            let outcome = session.command(command);
            if !outcome.is_applied() {
                return Err(CliError::NotApplied(outcome));
            }
            let text = session.to_json_string(args.pretty)?;
            println!("{text}");
            Ok(())
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err @ CliError::NotApplied(_)) => {
            eprintln!("{err}");
            std::process::exit(4);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
