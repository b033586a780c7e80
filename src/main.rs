use cardmax::application::engine::RewardEngine;
use cardmax::domain::breakdown::{CardRewardResult, CombinationResult};
use cardmax::interfaces::catalog::load_catalog;
use cardmax::interfaces::csv::spending_reader::SpendingReader;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Card catalog JSON file
    catalog: PathBuf,

    /// Monthly spending CSV file with category,amount rows
    spending: PathBuf,

    /// Score a single card by id
    #[arg(long, conflicts_with_all = ["pair", "best_pair"])]
    card: Option<u16>,

    /// Optimize the split across a specific pair of cards
    #[arg(long, num_args = 2, value_names = ["FIRST", "SECOND"], conflicts_with = "best_pair")]
    pair: Option<Vec<u16>>,

    /// Search every unordered pair of catalog cards for the best combination
    #[arg(long)]
    best_pair: bool,

    /// Currency value of one mile
    #[arg(long, default_value = "0.02")]
    miles_value: Decimal,

    /// Emit JSON instead of the text report
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let catalog = load_catalog(&cli.catalog).into_diagnostic()?;
    let file = File::open(&cli.spending).into_diagnostic()?;
    let spending = SpendingReader::new(file)
        .into_spending()
        .into_diagnostic()?;
    let engine = RewardEngine::with_miles_value(catalog, cli.miles_value);

    if let Some(card_id) = cli.card {
        let result = engine.card_reward(card_id, &spending).into_diagnostic()?;
        if cli.json {
            print_json(&result)?;
        } else {
            print_card(&result);
        }
    } else if let Some(pair) = cli.pair {
        let result = engine
            .optimize_pair(pair[0], pair[1], &spending)
            .into_diagnostic()?;
        if cli.json {
            print_json(&result)?;
        } else {
            print_combination(&result);
        }
    } else if cli.best_pair {
        match engine.best_combination(&spending).into_diagnostic()? {
            Some(result) => {
                if cli.json {
                    print_json(&result)?;
                } else {
                    print_combination(&result);
                }
            }
            None => println!("catalog has fewer than two cards"),
        }
    } else {
        let ranked = engine.rank_cards(&spending).into_diagnostic()?;
        if cli.json {
            print_json(&ranked)?;
        } else {
            for (position, result) in ranked.iter().enumerate() {
                println!(
                    "#{} {} (id {}): {}",
                    position + 1,
                    result.card_name,
                    result.card_id,
                    result.capped_reward
                );
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).into_diagnostic()?
    );
    Ok(())
}

fn print_card(result: &CardRewardResult) {
    println!("{} ({})", result.card_name, result.assignment);
    for line in &result.lines {
        let marker = if line.over_cap { " [over cap]" } else { "" };
        println!(
            "  {}: {} x {} = {}{}",
            line.category, line.amount, line.rate, line.reward, marker
        );
    }
    println!("  reward: {}", result.capped_reward);
    if let Some(overflow) = result.cap_overflow {
        println!("  cap reached, {} forfeited", overflow);
    }
}

fn print_combination(result: &CombinationResult) {
    println!(
        "{} + {}: {}",
        result.first.card_name, result.second.card_name, result.combined_reward
    );
    print_card(&result.first);
    print_card(&result.second);
}
