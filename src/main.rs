use anyhow::{bail, Context, Result};
use clip_curator::store::{PageMove, Projection, RangeFields, SegmentEdit, Session, SlotUpdate};
use clip_curator::{DatasetStore, StoreConfig};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const HELP: &str = "\
Commands:
  n | next              next clip
  p | prev              previous clip
  go <index>            jump to zero-based index
  show                  redraw the current clip
  text <transcript>     replace the transcript and save
  seg <i> <start> <end> <text>
                        rewrite segment i (1-based) and save
  del                   delete the current clip
  range <start> <end>   delete clips numbered start..=end
  help | quit";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Setup Logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")?;

    let dir = match std::env::args().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => bail!("usage: clip-curator <dataset-dir>"),
    };

    // 2. Load + backup
    let store = DatasetStore::new(StoreConfig::from_env());
    let (mut session, first) = store
        .load_and_init(&dir)
        .with_context(|| format!("loading dataset from {}", dir.display()))?;
    tracing::info!("Curating {}", session.layout.primary.display());

    let mut view = first;
    render(&view);
    println!("{}", HELP);

    // 3. Command loop
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "q" {
            break;
        }

        match dispatch(&store, &mut session, view.page, line) {
            Ok(Some(next)) => {
                view = next;
                render(&view);
            }
            Ok(None) => {}
            Err(e) => tracing::error!("{:#}", e),
        }
    }

    Ok(())
}

fn dispatch(store: &DatasetStore, session: &mut Session, page: usize, line: &str) -> Result<Option<Projection>> {
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let view = match cmd {
        "n" | "next" => store.paginate(session, page, RangeFields::none(), PageMove::Step(1)),
        "p" | "prev" => store.paginate(session, page, RangeFields::none(), PageMove::Step(-1)),
        "go" => {
            let index = rest.parse::<i64>().context("go expects an index")?;
            store.paginate(session, page, RangeFields::none(), PageMove::To(index))
        }
        "show" => store.refresh(session, None),
        "text" => {
            let Some(key) = session.current_key().map(str::to_string) else {
                bail!("no clip selected");
            };
            let edits = current_edits(session, &key);
            let message = store.save(session, &key, rest, &edits)?;
            store.refresh(session, Some(message))
        }
        "seg" => {
            let mut parts = rest.splitn(4, ' ');
            let (Some(i), Some(start), Some(end)) = (parts.next(), parts.next(), parts.next()) else {
                bail!("seg expects <i> <start> <end> <text>");
            };
            let i = i.parse::<usize>().context("segment number must be an integer")?;
            let Some(key) = session.current_key().map(str::to_string) else {
                bail!("no clip selected");
            };
            let mut edits = current_edits(session, &key);
            let Some(edit) = i.checked_sub(1).and_then(|i| edits.get_mut(i)) else {
                bail!("clip {} has no segment {}", key, i);
            };
            edit.start = start.to_string();
            edit.end = end.to_string();
            edit.text = parts.next().unwrap_or_default().to_string();

            let text = session.dataset.get(&key).map(|r| r.text.clone()).unwrap_or_default();
            let message = store.save(session, &key, &text, &edits)?;
            store.refresh(session, Some(message))
        }
        "del" => {
            let Some(key) = session.current_key().map(str::to_string) else {
                bail!("no clip selected");
            };
            store.delete_entries(session, page, &[key])?
        }
        "range" => {
            let Some((start, end)) = rest.split_once(' ') else {
                bail!("range expects <start> <end>");
            };
            store.delete_multiple(session, page, start.trim(), end.trim())?
        }
        "help" => {
            println!("{}", HELP);
            return Ok(None);
        }
        other => bail!("unknown command {:?} (try help)", other),
    };

    Ok(Some(view))
}

/// The record's segments as they stand, ready to be edited.
fn current_edits(session: &Session, key: &str) -> Vec<SegmentEdit> {
    let Some(record) = session.dataset.get(key) else {
        return Vec::new();
    };
    record
        .segments
        .iter()
        .map(|s| {
            SegmentEdit::new(
                s.text.clone(),
                clip_curator::store::format_seconds(s.start),
                clip_curator::store::format_seconds(s.end),
            )
        })
        .collect()
}

fn render(view: &Projection) {
    println!("---- {} ----", view.page_label);
    if let Some(path) = &view.audio_path {
        println!("audio: {} ({})", view.audio_name, path.display());
    }
    println!("text:  {}", view.text);
    if let SlotUpdate::Replace(slots) = &view.segments {
        for (i, slot) in slots.iter().enumerate().filter(|(_, s)| s.visible) {
            println!("  [{}] {} - {}  {}", i + 1, slot.start, slot.end, slot.text);
        }
    }
    if !view.message.is_empty() {
        println!(">> {}", view.message);
    }
}
