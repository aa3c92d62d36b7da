//! Story command handlers.

use super::Commands;
use infinite_heroes::{
    ConsoleObserver, HeroesConfig, HeroesResult, PageStatus, StoryRuntime, StoryState,
    StoryLayout, StorySetup, StorageError, StorageErrorKind, ValidationError, ValidationErrorKind,
    finished_story_pages, load_portrait,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Execute one CLI command.
pub async fn run_command(command: Commands) -> HeroesResult<()> {
    let config = HeroesConfig::load()?;
    let runtime = || StoryRuntime::from_config(&config, Arc::new(ConsoleObserver));

    match command {
        Commands::New {
            hero,
            hero_name,
            costar,
            costar_name,
            genre,
            language,
            premise,
            rich,
        } => {
            let hero = load_portrait(&hero, hero_name, "").await?;
            let costar = match costar {
                Some(path) => Some(load_portrait(&path, costar_name, "").await?),
                None => None,
            };
            let setup = StorySetup::builder()
                .hero(Some(hero))
                .costar(costar)
                .genre(genre)
                .language(language)
                .premise(premise)
                .rich_mode(rich)
                .build()
                .map_err(|_| ValidationError::new(ValidationErrorKind::MissingHero))?;
            let state = runtime()?.start(setup).await?;
            print_state(&state);
        }

        Commands::Choose { page, choice } => {
            let state = runtime()?.choose(page, &choice).await?;
            print_state(&state);
        }

        Commands::Status => {
            let runtime = runtime()?;
            match runtime.saved().await? {
                Some(_) => {
                    runtime.orchestrator().restore().await?;
                    let state = runtime.orchestrator().store().snapshot().await;
                    print_state(&state);
                }
                None => println!("No story in progress. Start one with `infinite-heroes new`."),
            }
        }

        Commands::Share => {
            println!("{}", runtime()?.share_token().await?);
        }

        Commands::Replay {
            token,
            hero,
            export,
        } => {
            let hero = load_portrait(&hero, "", "").await?;
            let state = runtime()?.replay(&token, hero).await?;
            print_state(&state);
            if let Some(output) = export {
                let document = infinite_heroes::ExportDocument::compose(state.pages());
                write_document(&output, &document.render_html()).await?;
            }
        }

        Commands::Export { output } => {
            let document = runtime()?.export().await?;
            if document.is_empty() {
                println!("No finished pages to export yet.");
                return Ok(());
            }
            write_document(&output, &document.render_html()).await?;
        }

        Commands::Reset => {
            runtime()?.reset().await;
            println!("Story discarded.");
        }
    }

    Ok(())
}

async fn write_document(path: &Path, html: &str) -> HeroesResult<()> {
    tokio::fs::write(path, html).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileWrite(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })?;
    info!(path = %path.display(), "Exported story");
    println!("Wrote {}", path.display());
    Ok(())
}

fn print_state(state: &StoryState) {
    let config = state.config();
    println!(
        "{} | {} | {}",
        config.genre(),
        config.tone().label(),
        config.language_name()
    );
    if let Some(costar) = state.costar() {
        println!("Co-star: {}", costar.name());
    }

    for page in state.sorted_pages() {
        let status = match page.status() {
            PageStatus::Ready => "ready",
            PageStatus::Failed => "FAILED",
            _ => "pending",
        };
        println!("\n[{}] {}", page.id(), status);
        if let Some(beat) = page.narrative() {
            if !beat.caption().is_empty() {
                println!("  {}", beat.caption());
            }
            if !beat.dialogue().is_empty() {
                println!("  \"{}\"", beat.dialogue());
            }
        }
        if let Some(choice) = page.resolved_choice() {
            println!("  Chosen: {}", choice);
        } else {
            for (i, choice) in page.open_choices().iter().enumerate() {
                println!("  {}) {}", i + 1, choice);
            }
        }
    }

    println!(
        "\n{} of {} story pages finished.",
        finished_story_pages(state),
        StoryLayout::default().max_story_pages()
    );
}
