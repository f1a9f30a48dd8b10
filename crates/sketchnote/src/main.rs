//! `sknote` - CLI for sketchnote
//!
//! This binary manages notebooks and notes in the local database, replays
//! pointer scripts into note drawings, and exports drawings as SVG.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Read;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{debug, warn};

use sketchnote::canvas::{Presentation, SizeOverrides, StrokeCanvas, SvgSurface};
use sketchnote::cli::{
    Cli, Command, ConfigCommand, DrawCommand, FriendCommand, NoteCommand, NotebookCommand,
    OutputFormat, ProfileCommand, RenderCommand,
};
use sketchnote::library::OWNED_SOURCE;
use sketchnote::notebook::{normalize_email, Note, Notebook};
use sketchnote::user::FriendAccess;
use sketchnote::{
    init_logging, script, Config, LibraryLoader, NoteEditor, NoteStore, SharedStorage, Storage,
    User,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let mut config =
        Config::load_from(cli.config.clone()).context("failed to load configuration")?;
    if let Some(user) = &cli.user {
        config.profile.user_id = user.trim().to_string();
    }
    if let Some(email) = &cli.email {
        config.profile.email = Some(normalize_email(email));
    }
    config.validate()?;

    match cli.command {
        Command::Notebook(cmd) => handle_notebook(&config, cmd).await,
        Command::Note(cmd) => handle_note(&config, cmd).await,
        Command::Friend(cmd) => handle_friend(&config, cmd),
        Command::Profile(cmd) => handle_profile(&config, cmd),
        Command::Draw(cmd) => handle_draw(&config, cmd).await,
        Command::Render(cmd) => handle_render(&config, &cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_storage(config: &Config) -> anyhow::Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("failed to open {}", path.display()))
}

async fn handle_notebook(config: &Config, cmd: NotebookCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    match cmd {
        NotebookCommand::Create { title } => {
            let notebook = storage.create_notebook(&config.profile.user_id, title.as_deref())?;
            println!("Created notebook {} \"{}\"", notebook.id, notebook.title);
        }
        NotebookCommand::List {
            owned,
            shared,
            format,
        } => {
            if shared && config.profile.email.is_none() {
                bail!("no email configured; set profile.email or pass --email");
            }
            list_notebooks(config, storage, owned, shared, format).await?;
        }
        NotebookCommand::Show { id, format } => {
            let Some(notebook) = storage.get_notebook(id)? else {
                bail!("notebook {id} not found");
            };
            if format.is_json() {
                println!("{}", serde_json::to_string_pretty(&notebook)?);
            } else {
                print_notebook_detail(&notebook);
            }
        }
        NotebookCommand::Rename { id, title } => {
            storage.rename_notebook(id, &title)?;
            println!("Renamed notebook {id}");
        }
        NotebookCommand::Describe { id, description } => {
            storage.describe_notebook(id, &description)?;
            println!("Updated description of notebook {id}");
        }
        NotebookCommand::Delete { id, yes } => {
            if !yes {
                println!("This deletes notebook {id} and all of its notes.");
                println!("Use --yes to confirm.");
                return Ok(());
            }
            if storage.delete_notebook(id, &config.profile.user_id)? {
                println!("Deleted notebook {id}");
            } else {
                bail!("notebook {id} not found");
            }
        }
        NotebookCommand::Share { id, address } => {
            if storage.share_notebook(id, &address)? {
                println!("Shared notebook {id} with {}", normalize_email(&address));
            } else {
                println!(
                    "Notebook {id} is already shared with {}",
                    normalize_email(&address)
                );
            }
        }
        NotebookCommand::Unshare { id, address } => {
            if storage.unshare_notebook(id, &address)? {
                println!(
                    "Notebook {id} is no longer shared with {}",
                    normalize_email(&address)
                );
            } else {
                println!("Notebook {id} was not shared with {}", normalize_email(&address));
            }
        }
    }
    Ok(())
}

async fn list_notebooks(
    config: &Config,
    storage: Storage,
    owned_only: bool,
    shared_only: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let store: Arc<dyn NoteStore> = Arc::new(SharedStorage::new(storage));
    let loader = LibraryLoader::new(
        store,
        config.profile.user_id.clone(),
        config.profile.email.clone(),
    );
    let library = loader.load().await?;
    for (source, message) in library.summary.failures() {
        let which = if source == OWNED_SOURCE { "your" } else { "shared" };
        warn!("Could not load {} notebooks: {}", which, message);
    }

    if owned_only {
        return print_notebooks(&library.owned, format);
    }
    if shared_only {
        return print_notebooks(&library.shared, format);
    }
    if format.is_json() {
        let both = serde_json::json!({
            "owned": library.owned,
            "shared": library.shared,
        });
        println!("{}", serde_json::to_string_pretty(&both)?);
        return Ok(());
    }

    println!("Your notebooks");
    print_notebooks(&library.owned, format)?;
    if config.profile.email.is_some() {
        println!();
        println!("Shared with you");
        print_notebooks(&library.shared, format)?;
    }
    Ok(())
}

fn print_notebooks(notebooks: &[Notebook], format: OutputFormat) -> anyhow::Result<()> {
    if format.is_json() {
        println!("{}", serde_json::to_string_pretty(notebooks)?);
        return Ok(());
    }
    if notebooks.is_empty() {
        println!("No notebooks.");
        return Ok(());
    }
    for notebook in notebooks {
        println!(
            "{:>4}  {:<30}  {:>3} notes  {}",
            notebook.id,
            notebook.title,
            notebook.notes.len(),
            notebook.last_modified.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn print_notebook_detail(notebook: &Notebook) {
    println!("{} (#{})", notebook.title, notebook.id);
    println!("{}", notebook.description);
    println!();
    println!("Owner:         {}", notebook.created_by);
    if notebook.shared_with.is_empty() {
        println!("Shared with:   nobody");
    } else {
        println!("Shared with:   {}", notebook.shared_with.join(", "));
    }
    println!("Created:       {}", notebook.created_at.to_rfc3339());
    println!("Last modified: {}", notebook.last_modified.to_rfc3339());
    println!();
    for note in &notebook.notes {
        print_note_line(note);
    }
}

fn print_note_line(note: &Note) {
    let marker = if note.has_drawing() { "✎" } else { " " };
    println!("{:>4} {marker} {}", note.id, note.title);
}

/// Register the configured identity and return it. Friends and profiles
/// need an email.
fn current_user(config: &Config, storage: &Storage) -> anyhow::Result<User> {
    let Some(email) = &config.profile.email else {
        bail!("no email configured; set profile.email or pass --email");
    };
    Ok(storage.register_user(&config.profile.user_id, email)?)
}

fn print_user(user: &User) {
    match &user.username {
        Some(username) => println!("{}  @{username}  <{}>", user.label(), user.email),
        None => println!("{}  <{}>", user.label(), user.email),
    }
}

fn handle_friend(config: &Config, cmd: FriendCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let me = current_user(config, &storage)?;
    match cmd {
        FriendCommand::Add { address } => {
            let Some(friend) = storage.find_users_by_email(&address, &me.id)?.into_iter().next()
            else {
                bail!("no registered user with email {}", normalize_email(&address));
            };
            if storage.add_friend(&me.id, &friend.id)? {
                println!("You and {} are now friends", friend.label());
            } else {
                println!("You and {} are already friends", friend.label());
            }
        }
        FriendCommand::List { notebook, format } => {
            let access = match notebook {
                Some(id) => storage.friend_access(&me.id, id)?,
                None => storage
                    .list_friends(&me.id)?
                    .into_iter()
                    .map(|friend| FriendAccess {
                        friend,
                        has_access: false,
                    })
                    .collect(),
            };
            if format.is_json() {
                if notebook.is_some() {
                    println!("{}", serde_json::to_string_pretty(&access)?);
                } else {
                    let friends: Vec<&User> = access.iter().map(|a| &a.friend).collect();
                    println!("{}", serde_json::to_string_pretty(&friends)?);
                }
            } else if access.is_empty() {
                println!("No friends yet. Add one with `sknote friend add <email>`.");
            } else {
                for entry in &access {
                    if entry.has_access {
                        print!("[shared] ");
                    } else if notebook.is_some() {
                        print!("         ");
                    }
                    print_user(&entry.friend);
                }
            }
        }
        FriendCommand::Search { address } => {
            let found = storage.find_users_by_email(&address, &me.id)?;
            if found.is_empty() {
                println!("No users found.");
            }
            found.iter().for_each(print_user);
        }
    }
    Ok(())
}

fn handle_profile(config: &Config, cmd: ProfileCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let me = current_user(config, &storage)?;
    match cmd {
        ProfileCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&me)?);
            } else {
                println!("User:         {}", me.id);
                println!("Email:        {}", me.email);
                println!("Display name: {}", me.label());
                println!(
                    "Username:     {}",
                    me.username.as_deref().unwrap_or("(none)")
                );
            }
        }
        ProfileCommand::Set { name, username } => {
            if name.is_none() && username.is_none() {
                bail!("nothing to change; pass --name and/or --username");
            }
            let me = storage.update_profile(&me.id, name.as_deref(), username.as_deref())?;
            println!("Profile updated");
            print_user(&me);
        }
    }
    Ok(())
}

async fn handle_note(config: &Config, cmd: NoteCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    match cmd {
        NoteCommand::Add { notebook } => {
            let note = storage.add_note(notebook)?;
            println!("Added note {} to notebook {notebook}", note.id);
        }
        NoteCommand::List { notebook, format } => {
            let notes = storage.list_notes(notebook)?;
            if format.is_json() {
                println!("{}", serde_json::to_string_pretty(&notes)?);
            } else if notes.is_empty() {
                println!("No notes.");
            } else {
                notes.iter().for_each(print_note_line);
            }
        }
        NoteCommand::Show {
            notebook,
            note,
            format,
        } => {
            let Some(note) = storage.get_note(notebook, note)? else {
                bail!("note {notebook}/{note} not found");
            };
            if format.is_json() {
                println!("{}", serde_json::to_string_pretty(&note)?);
            } else {
                let options = config.canvas_options(SizeOverrides::default());
                let strokes = StrokeCanvas::new(&note.drawing, options).drawing().len();
                println!("{}", note.title);
                println!();
                println!("{}", note.content);
                println!();
                println!("Drawing: {strokes} strokes");
                println!("Last modified: {}", note.last_modified.to_rfc3339());
            }
        }
        NoteCommand::Edit {
            notebook,
            note,
            title,
            content,
        } => {
            if title.is_none() && content.is_none() {
                bail!("nothing to change; pass --title and/or --content");
            }
            let store: Arc<dyn NoteStore> = Arc::new(SharedStorage::new(storage));
            let mut editor = NoteEditor::open(
                store,
                notebook,
                note,
                config.editor_options(SizeOverrides::default()),
            )
            .await?;
            if let Some(title) = title {
                editor.set_title(title);
            }
            if let Some(content) = content {
                editor.set_content(content);
            }
            editor.flush_autosave().await?;
            if editor.has_unsaved_text() {
                bail!("failed to save note {notebook}/{note}");
            }
            editor.close();
            println!("Updated note {notebook}/{note}");
        }
        NoteCommand::Delete { notebook, note } => {
            if storage.delete_note(notebook, note)? {
                println!("Deleted note {notebook}/{note}");
            } else {
                bail!("note {notebook}/{note} not found");
            }
        }
    }
    Ok(())
}

async fn handle_draw(config: &Config, cmd: DrawCommand) -> anyhow::Result<()> {
    let text = match &cmd.script {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read script from stdin")?;
            buf
        }
    };
    let steps = script::parse_script(&text)?;
    debug!("Parsed {} script steps", steps.len());

    let store: Arc<dyn NoteStore> = Arc::new(SharedStorage::new(open_storage(config)?));
    let mut editor = NoteEditor::open(
        store,
        cmd.notebook,
        cmd.note,
        config.editor_options(SizeOverrides::default()),
    )
    .await?;

    if let Some(index) = cmd.color {
        editor.canvas_mut().select_color(index)?;
    }
    let stats = script::replay(editor.canvas_mut(), &steps)?;
    if editor.canvas().in_progress().is_some() {
        warn!("Script ended mid-stroke; the unfinished stroke was discarded");
    }

    if cmd.no_save {
        println!("{}", editor.pending_drawing());
        editor.close();
        return Ok(());
    }

    let strokes = editor.canvas().drawing().len();
    if editor.save_drawing().await? {
        println!(
            "Saved drawing: {} added, {} undone, {strokes} strokes total",
            stats.strokes, stats.undone
        );
    } else {
        println!("Drawing unchanged ({strokes} strokes)");
    }
    editor.close();
    Ok(())
}

fn handle_render(config: &Config, cmd: &RenderCommand) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let Some(note) = storage.get_note(cmd.notebook, cmd.note)? else {
        bail!("note {}/{} not found", cmd.notebook, cmd.note);
    };

    let options = config.canvas_options(SizeOverrides {
        width: cmd.width,
        height: cmd.height,
    });
    let canvas = StrokeCanvas::new(&note.drawing, options);
    let mut surface = SvgSurface::new(options.size);

    match canvas.present(&mut surface) {
        Presentation::Unsupported { notice } => {
            println!("{notice}");
        }
        Presentation::Surface { drawn, skipped } => {
            if skipped > 0 {
                warn!("Skipped {} unreadable strokes", skipped);
            }
            let svg = surface.finish();
            match &cmd.output {
                Some(path) => {
                    std::fs::write(path, svg)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Wrote {drawn} strokes to {}", path.display());
                }
                None => println!("{svg}"),
            }
        }
    }
    Ok(())
}

async fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let shared = SharedStorage::new(open_storage(config)?);
    let stats = shared.lock().await.stats()?;

    let store: Arc<dyn NoteStore> = Arc::new(shared);
    let loader = LibraryLoader::new(
        store,
        config.profile.user_id.clone(),
        config.profile.email.clone(),
    );
    let library = loader.load().await?;
    let failures: Vec<String> = library
        .summary
        .failures()
        .into_iter()
        .map(|(_, msg)| msg.to_string())
        .collect();

    if json {
        let status = serde_json::json!({
            "user_id": config.profile.user_id,
            "email": config.profile.email,
            "database_path": config.database_path(),
            "owned_notebooks": library.owned.len(),
            "shared_notebooks": library.shared.len(),
            "load_failures": failures,
            "storage": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("sknote status");
        println!("-------------");
        println!("User:          {}", config.profile.user_id);
        println!(
            "Email:         {}",
            config.profile.email.as_deref().unwrap_or("(none)")
        );
        println!("Database:      {}", config.database_path().display());
        println!("Size:          {} bytes", stats.db_size_bytes);
        println!();
        println!("Your notebooks:   {}", library.owned.len());
        println!("Shared with you:  {}", library.shared.len());
        println!(
            "All notes:        {} ({} with drawings)",
            stats.notes, stats.notes_with_drawings
        );
        for failure in &failures {
            println!("Load failed:      {failure}");
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Profile]");
                println!("  User id:            {}", config.profile.user_id);
                println!(
                    "  Email:              {}",
                    config.profile.email.as_deref().unwrap_or("(none)")
                );
                println!();
                println!("[Canvas]");
                println!("  Line width:         {}", config.canvas.line_width);
                println!("  Min segment length: {}", config.canvas.min_segment_length);
                println!("  Native surface:     {}", config.canvas.native_surface);
                println!(
                    "  Viewport:           {}x{}",
                    config.canvas.viewport_width, config.canvas.viewport_height
                );
                println!();
                println!("[Autosave]");
                println!("  Debounce (ms):      {}", config.autosave.debounce_ms);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
