//! Interactive command-line driver for the screening timer. All logic lives
//! in the library; this loop only parses lines and prints results.

use std::path::PathBuf;

use anyhow::Result;
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

use screenlog::timecode::format_timecode;
use screenlog::{App, Genre, TimerStatus};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let data_dir = std::env::var("SCREENLOG_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".screenlog"));
    info!("using data dir {}", data_dir.display());

    let mut app = App::open(data_dir).await;
    if app.setup_required() {
        println!("setup required: run `setup <genre> [name]` (genres: default, comedy, action, documentary)");
    } else {
        println!("screening: {}", app.state().screening_name);
    }
    print_status(&app).await;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    print!("> ");
    flush();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        match command {
            "" => {}
            "help" => print_help(),
            "quit" | "exit" => break,
            "status" | "time" => print_status(&app).await,
            "setup" => {
                let (genre, name) = match rest.split_once(' ') {
                    Some((genre, name)) => (genre, name.trim()),
                    None => (rest, ""),
                };
                match genre.parse::<Genre>() {
                    Ok(genre) => {
                        let session = app.complete_setup(name, genre).await;
                        println!("started '{}' [{}]", session.name, session.id);
                        println!("buttons: {}", app.state().button_labels.join(", "));
                    }
                    Err(err) => println!("{err}"),
                }
            }
            "start" | "pause" | "toggle" => {
                if app.setup_required() {
                    println!("run setup first");
                } else {
                    match command {
                        "start" => app.start_timer().await,
                        "pause" => app.pause_timer().await,
                        _ => app.toggle_timer().await,
                    }
                    print_status(&app).await;
                }
            }
            "note" => record(&mut app, rest, None).await,
            "other" => record(&mut app, "other", Some(rest)).await,
            "notes" => {
                let notes = app
                    .state()
                    .sessions
                    .active()
                    .map(|session| session.notes.clone())
                    .unwrap_or_default();
                if notes.is_empty() {
                    println!("no notes yet");
                }
                for (index, note) in notes.iter().enumerate() {
                    println!("{index:3}  {}  {}", note.timecode, note.display_label());
                }
            }
            "undo" => match app.undo_last_note().await {
                Some(note) => println!("removed '{}'", note.display_label()),
                None => println!("nothing to undo"),
            },
            "edit" => match rest.split_once(' ') {
                Some((index, text)) => match index.parse::<usize>() {
                    Ok(index) => app.edit_note(index, Some(text)).await,
                    Err(_) => println!("usage: edit <index> <text>"),
                },
                None => println!("usage: edit <index> <text>"),
            },
            "del" => match rest.parse::<usize>() {
                Ok(index) => app.delete_note(index).await,
                Err(_) => println!("usage: del <index>"),
            },
            "clear" => {
                app.clear_notes().await;
                println!("notes cleared");
            }
            "summary" => {
                for (label, count) in app.note_summary() {
                    println!("{count:4}  {label}");
                }
            }
            "sessions" => {
                if let Some(active) = app.state().sessions.active() {
                    println!("* {}  {} ({} notes)", active.id, active.name, active.notes.len());
                }
                for session in app.state().sessions.history() {
                    println!("  {}  {} ({} notes)", session.id, session.name, session.notes.len());
                }
            }
            "new" => {
                let result = app.new_session(rest).await;
                report(result.map(|session| format!("started '{}' [{}]", session.name, session.id)));
            }
            "load" => {
                let result = app.load_session(rest).await;
                let fps = app.state().fps;
                report(result.map(|session| {
                    format!(
                        "loaded '{}' at {}",
                        session.name,
                        format_timecode(session.elapsed_seconds, fps)
                    )
                }));
            }
            "rename" => match rest.split_once(' ') {
                Some((id, name)) => report(app.rename_session(id, name).await.map(|_| "renamed".to_string())),
                None => println!("usage: rename <id> <name>"),
            },
            "delete" => report(app.delete_session(rest).await.map(|_| "deleted".to_string())),
            "labels" => {
                let labels: Vec<String> =
                    rest.split(',').map(|label| label.trim().to_string()).collect();
                let result = app.set_button_labels(labels).await;
                report(result.map(|_| format!("buttons: {}", app.state().button_labels.join(", "))));
            }
            "fps" => match rest.parse::<f64>() {
                Ok(fps) => report(app.set_fps(fps).await.map(|_| format!("fps = {fps}"))),
                Err(_) => println!("usage: fps <number>"),
            },
            "dim" => match rest.parse::<u8>() {
                Ok(level) => {
                    app.set_dim_level(level).await;
                    println!("dim = {}", app.state().dim_level);
                }
                Err(_) => println!("usage: dim <0-85>"),
            },
            "export" => {
                let result = match rest {
                    "csv" => app.export_csv(),
                    "text" => app.export_text(),
                    "email" => app.export_email(),
                    _ => {
                        println!("usage: export csv|text|email");
                        print!("> ");
                        flush();
                        continue;
                    }
                };
                report(result);
            }
            other => println!("unknown command '{other}' (try `help`)"),
        }
        print!("> ");
        flush();
    }

    Ok(())
}

async fn record(app: &mut App, label: &str, context: Option<&str>) {
    if label.is_empty() {
        println!("usage: note <label>");
        return;
    }
    match app.record_note(label, context.filter(|text| !text.is_empty())).await {
        Ok(note) => println!("{}  {}", note.timecode, note.display_label()),
        Err(err) => println!("{err}"),
    }
}

async fn print_status(app: &App) {
    let snapshot = app.timer_snapshot().await;
    let label = match snapshot.status {
        TimerStatus::Running => "RUNNING",
        TimerStatus::Paused => "PAUSED",
        TimerStatus::Stopped => "STOPPED",
    };
    println!(
        "{label}  {}",
        format_timecode(snapshot.elapsed_seconds, app.state().fps)
    );
}

fn report<T: std::fmt::Display, E: std::fmt::Display>(result: Result<T, E>) {
    match result {
        Ok(message) => println!("{message}"),
        Err(err) => println!("{err}"),
    }
}

fn print_help() {
    println!(
        "commands:\n  \
         setup <genre> [name]   first-run setup (default|comedy|action|documentary)\n  \
         start | pause | toggle timer control\n  \
         time                   show elapsed timecode\n  \
         note <label>           record a note at the current time\n  \
         other <text>           record an 'other' note with free text\n  \
         notes | undo | edit <i> <text> | del <i> | clear\n  \
         summary                note counts by label\n  \
         sessions | new [name] | load <id> | rename <id> <name> | delete <id>\n  \
         labels a, b, c         replace button labels (3-10)\n  \
         fps <n> | dim <0-85>\n  \
         export csv|text|email\n  \
         quit"
    );
}

fn flush() {
    use std::io::Write;
    let _ = std::io::stdout().flush();
}
