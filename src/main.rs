use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{CommandFactory, Parser, ValueEnum};
use color_eyre::eyre::eyre;

use glyphpick::commit::SelectionHandler;
use glyphpick::filter::filter;
use glyphpick::host::TextField;
use glyphpick::nav::Layout;
use glyphpick::picker::{Action, Picker};
use glyphpick::tree::build;
use glyphpick::{config, ui};

/// Terminal emoji picker: filter by keyword, navigate, insert into a text field
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file with the category tree (defaults to the built-in set)
    #[arg(long)]
    emojis: Option<PathBuf>,

    /// JSON file mapping emojis to keyword names
    #[arg(long)]
    keywords: Option<PathBuf>,

    /// How cells are arranged
    #[arg(long, value_enum, default_value_t = LayoutArg::Rows)]
    layout: LayoutArg,

    /// Initial contents of the text field
    #[arg(long, default_value = "")]
    text: String,

    /// Initial filter query
    #[arg(long)]
    query: Option<String>,

    /// Print the (filtered) category outline and exit
    #[arg(long)]
    list: bool,

    /// Write logs to this file (filter with GLYPHPICK_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Generate usage spec for this tool
    #[arg(long)]
    usage: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LayoutArg {
    /// One line per subcategory
    Rows,
    /// Wrapping grid sized to the terminal width
    Grid,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Rows => Layout::Rows,
            LayoutArg::Grid => Layout::Grid { columns: 1 },
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    // Handle --usage flag to output usage spec
    if args.usage {
        let mut cmd = Args::command();
        let bin_name = std::env::args()
            .next()
            .unwrap_or_else(|| "glyphpick".to_string());
        let mut buf = Vec::new();
        clap_usage::generate(&mut cmd, bin_name, &mut buf);
        print!("{}", String::from_utf8_lossy(&buf));
        return Ok(());
    }

    if let Some(ref path) = args.log_file {
        init_logging(path)?;
    }

    let (raw, keywords) = config::load(args.emojis.as_deref(), args.keywords.as_deref())
        .map_err(|e| eyre!("Failed to load emoji configuration: {}", e))?;
    let tree = build(&raw, &keywords).map_err(|e| eyre!("Invalid emoji configuration: {}", e))?;
    tracing::info!(items = tree.item_count(), "loaded emoji tree");

    if args.list {
        let tree = std::sync::Arc::new(tree);
        match filter(&tree, args.query.as_deref().unwrap_or_default()) {
            Some(pruned) => print!("{pruned}"),
            None => println!("No emojis found"),
        }
        return Ok(());
    }

    let mut picker = Picker::new(tree).with_layout(args.layout.into());
    if let Some(ref query) = args.query {
        picker.set_query(query);
    }
    let mut field = TextField::new(args.text);

    // Enable mouse capture before initializing the terminal
    crossterm::execute!(std::io::stderr(), crossterm::event::EnableMouseCapture)?;

    let mut terminal = ratatui::init();
    let result = run_event_loop(&mut terminal, &mut picker, &mut field);

    // Restore terminal and disable mouse capture
    ratatui::restore();
    crossterm::execute!(std::io::stderr(), crossterm::event::DisableMouseCapture)?;

    result?;
    println!("{}", field.text());
    Ok(())
}

/// Send tracing output to `path`; the terminal belongs to the UI.
fn init_logging(path: &Path) -> color_eyre::Result<()> {
    use tracing_subscriber::EnvFilter;

    let file = std::fs::File::create(path)
        .map_err(|e| eyre!("Failed to create log file '{}': {}", path.display(), e))?;
    let filter = EnvFilter::try_from_env("GLYPHPICK_LOG")
        .unwrap_or_else(|_| EnvFilter::new("glyphpick=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Run until the user commits without "continue selecting", aborts, or
/// presses Ctrl+C.
fn run_event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    picker: &mut Picker,
    field: &mut TextField,
) -> color_eyre::Result<()> {
    use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

    loop {
        terminal.draw(|frame| ui::render(frame, picker, field))?;

        let action = match event::read()? {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Global quit shortcut
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    field.on_abort();
                    return Ok(());
                }

                picker.handle_key(key, field)
            }
            Event::Mouse(mouse) => picker.handle_mouse(mouse, field),
            Event::Resize(_, _) => {
                // Terminal will be redrawn on next loop iteration
                Action::None
            }
            _ => Action::None,
        };

        match action {
            Action::None
            | Action::Commit {
                continue_selecting: true,
            } => {}
            Action::Commit {
                continue_selecting: false,
            }
            | Action::Abort => return Ok(()),
        }
    }
}
