use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use winrate_client::{
    BattleOrchestrator, ClientConfig, HttpSimulator, PokeApiSource, RunError, SpeciesDirectory,
};
use winrate_team::{FileStorage, Resolution, Roster, Storage, TeamEditor};

fn rain_team() -> Result<Roster> {
    let sets = json!([
        {
            "species": "Articuno", "item": "Leftovers", "ability": "Pressure", "nature": "Modest",
            "evs": {"hp": 252, "atk": 0, "def": 0, "spa": 252, "spd": 4, "spe": 0},
            "ivs": {"hp": 31, "atk": 31, "def": 31, "spa": 30, "spd": 30, "spe": 31},
            "moves": ["Ice Beam", "Hurricane", "Substitute", "Roost"]
        },
        {
            "species": "Ludicolo", "item": "Life Orb", "ability": "Swift Swim", "nature": "Modest",
            "evs": {"hp": 4, "atk": 0, "def": 0, "spa": 252, "spd": 0, "spe": 252},
            "moves": ["Surf", "Giga Drain", "Ice Beam", "Rain Dance"]
        },
        {
            "species": "Volbeat", "gender": "M", "item": "Damp Rock", "ability": "Prankster", "nature": "Bold",
            "evs": {"hp": 248, "atk": 0, "def": 252, "spa": 0, "spd": 8, "spe": 0},
            "moves": ["Tail Glow", "Baton Pass", "Encore", "Rain Dance"]
        },
        {
            "species": "Seismitoad", "item": "Life Orb", "ability": "Swift Swim", "nature": "Modest",
            "evs": {"hp": 0, "atk": 0, "def": 0, "spa": 252, "spd": 4, "spe": 252},
            "moves": ["Hydro Pump", "Earth Power", "Stealth Rock", "Rain Dance"]
        },
        {
            "species": "Alomomola", "item": "Damp Rock", "ability": "Regenerator", "nature": "Bold",
            "evs": {"hp": 252, "atk": 0, "def": 252, "spa": 0, "spd": 4, "spe": 0},
            "moves": ["Quick Attack", "Protect", "Toxic", "Rain Dance"]
        },
        {
            "species": "Armaldo", "item": "Leftovers", "ability": "Swift Swim", "nature": "Adamant",
            "evs": {"hp": 128, "atk": 252, "def": 4, "spa": 0, "spd": 0, "spe": 124},
            "moves": ["X-Scissor", "Stone Edge", "Aqua Tail", "Rapid Spin"]
        }
    ]);

    serde_json::from_value(sets).context("Default team is malformed")
}

/// Resolve type tags for every member that doesn't have them yet
async fn fill_types(team: &mut TeamEditor, species: &SpeciesDirectory) -> Result<()> {
    for index in 0..team.roster().len() {
        let Some(set) = team.roster().get(index) else {
            continue;
        };
        if set.types.is_some() {
            continue;
        }
        let name = set.species.clone();

        let ticket = team.begin_species_edit(index, name)?;
        match species.types_of(&ticket.species).await {
            Ok(types) => {
                if team.apply_species_types(&ticket, types)? == Resolution::Superseded {
                    println!("  {} changed while looking it up", ticket.species);
                }
            }
            Err(e) => {
                println!("  {}: {e}", ticket.species);
                team.discard_species_edit(&ticket);
            }
        }
    }
    Ok(())
}

fn print_team(label: &str, team: &Roster) {
    println!("{label}:");
    for set in team.iter() {
        let types = set
            .types
            .as_ref()
            .map(|types| {
                types
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_else(|| "?".to_string());
        println!("  {:<12} [{types}] {} EVs", set.name(), set.evs.total());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ClientConfig::from_env()?;
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.storage_dir));

    let default_team = rain_team()?;
    let mut team1 = TeamEditor::open("team1", default_team.clone(), storage.clone());
    let mut team2 = TeamEditor::open("team2", default_team, storage);

    let species = SpeciesDirectory::new(Arc::new(PokeApiSource::new(&config.pokeapi_url)));
    fill_types(&mut team1, &species).await?;
    fill_types(&mut team2, &species).await?;

    print_team("Team 1", team1.roster());
    print_team("Team 2", team2.roster());

    let battles = BattleOrchestrator::new(HttpSimulator::new(&config.simulator_url));
    println!(
        "\nSimulating {} battles of {}...",
        config.trials,
        config.format.label()
    );

    match battles
        .run(team1.roster(), team2.roster(), config.format, config.trials)
        .await
    {
        Ok(summary) => {
            println!("Team 1 wins: {} ({:.1}%)", summary.player1_wins, summary.win_rates.player1 * 100.0);
            println!("Team 2 wins: {} ({:.1}%)", summary.player2_wins, summary.win_rates.player2 * 100.0);
            println!("Draws:       {}", summary.draws);
            println!("Avg battle:  {:.0} ms", summary.average_duration_ms);
        }
        Err(RunError::Rejected(errors)) => {
            if let Some(e) = errors.team1 {
                println!("Team 1 is invalid: {e}");
            }
            if let Some(e) = errors.team2 {
                println!("Team 2 is invalid: {e}");
            }
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
