use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use blackjack::{
    Action, CardSet, CasinoRules, DealerRef, DoublingMode, FinalScore, RulePreset, Snapshot,
    Strategy, MAX_SCORE,
};
use blackjack_odds::contract::{instantiate, query};
use blackjack_odds::msg::{InstantiateMsg, QueryMsg};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "odds-calc",
    about = "Exact blackjack odds and strategy tables for a rule configuration"
)]
struct Cli {
    /// JSON file holding an instantiate message (cards, rules, settings)
    #[arg(long, env = "ODDS_CONFIG")]
    config: Option<PathBuf>,

    /// Use a preset: default, european, atlantic_city, single_deck, no_frills
    #[arg(long, env = "ODDS_PRESET")]
    preset: Option<String>,

    /// Card weights of an N-deck shoe
    #[arg(long, env = "ODDS_DECKS")]
    decks: Option<u8>,

    /// max_payout, max_hands, hitLoss_standLoss or max_win
    #[arg(long, env = "ODDS_STRATEGY")]
    strategy: Option<String>,

    /// Dealer stands at or above this score
    #[arg(long, env = "ODDS_STAND_THRESHOLD")]
    stand_threshold: Option<u8>,

    /// Doubling: none, nine_ten_eleven, nine_ten_eleven_plus_soft, any_pair
    #[arg(long, env = "ODDS_DOUBLING")]
    doubling: Option<String>,

    /// Pairs may be split
    #[arg(long, env = "ODDS_SPLIT", action = clap::ArgAction::Set)]
    split: Option<bool>,

    /// Double after split allowed
    #[arg(long, env = "ODDS_DOUBLE_AFTER_SPLIT", action = clap::ArgAction::Set)]
    double_after_split: Option<bool>,

    /// Ace plus ten after a split pays as blackjack
    #[arg(long, env = "ODDS_BLACKJACK_AFTER_SPLIT", action = clap::ArgAction::Set)]
    blackjack_after_split: Option<bool>,

    /// Split aces may draw more cards
    #[arg(long, env = "ODDS_HIT_SPLIT_ACES", action = clap::ArgAction::Set)]
    hit_split_aces: Option<bool>,

    /// Naturals pay 3:2
    #[arg(long, env = "ODDS_BLACKJACK_PAYOUT", action = clap::ArgAction::Set)]
    blackjack_payout: Option<bool>,

    /// Dealer hits soft 17
    #[arg(long, env = "ODDS_DEALER_HITS_SOFT_17", action = clap::ArgAction::Set)]
    dealer_hits_soft_17: Option<bool>,

    /// Force an action, as HAND@DEALER=ACTION (e.g. "16@10=stand"); repeatable
    #[arg(long = "override", value_name = "HAND@DEALER=ACTION")]
    overrides: Vec<String>,

    /// Print raw JSON query responses
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Overall expectation and the per-up-card breakdown (default)
    Summary,
    /// Dealer final-score probabilities per up-card
    Dealer,
    /// Preferred action for every hand against every up-card
    Strategy,
    /// Every evaluated action of one hand against one dealer reference
    Decision {
        hand: String,
        /// Up-card symbol or "average"
        #[arg(default_value = "average")]
        dealer: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let msg = instantiate_msg(&cli)?;
    let session = instantiate(msg)?;
    let snapshot = session
        .snapshot()
        .ok_or_else(|| anyhow!("no odds were published"))?;

    match cli.command.unwrap_or(Command::Summary) {
        Command::Summary if cli.json => print_json(query(&session, QueryMsg::Summary {})?),
        Command::Summary => print_summary(&snapshot),
        Command::Dealer if cli.json => {
            for dealer in DealerRef::all(snapshot.cards()) {
                let up_card = dealer.key(snapshot.cards());
                print_json(query(&session, QueryMsg::Dealer { up_card })?);
            }
        }
        Command::Dealer => print_dealer(&snapshot),
        Command::Strategy => print_strategy(&snapshot),
        Command::Decision { hand, dealer } if cli.json => {
            print_json(query(&session, QueryMsg::Decision { hand, dealer })?)
        }
        Command::Decision { hand, dealer } => print_decision(&snapshot, &hand, &dealer)?,
    }
    Ok(())
}

fn instantiate_msg(cli: &Cli) -> anyhow::Result<InstantiateMsg> {
    let mut msg = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => InstantiateMsg::default(),
    };

    if let Some(decks) = cli.decks {
        msg.cards = Some(CardSet::shoe(decks)?);
    }

    let mut rules = match &cli.preset {
        Some(preset) => preset.parse::<RulePreset>()?.rules(),
        None => msg.rules.unwrap_or_default(),
    };
    if let Some(mode) = &cli.doubling {
        rules.doubling_mode = mode.parse::<DoublingMode>()?;
    }
    let split = &mut rules.split_options;
    split.allowed = cli.split.unwrap_or(split.allowed);
    split.double_after_split = cli.double_after_split.unwrap_or(split.double_after_split);
    split.blackjack_after_split = cli
        .blackjack_after_split
        .unwrap_or(split.blackjack_after_split);
    split.hit_split_aces = cli.hit_split_aces.unwrap_or(split.hit_split_aces);
    rules.blackjack_payout = cli.blackjack_payout.unwrap_or(rules.blackjack_payout);
    rules.dealer_hits_soft_17 = cli.dealer_hits_soft_17.unwrap_or(rules.dealer_hits_soft_17);
    msg.rules = Some(rules);

    let mut settings = msg.settings.take().unwrap_or_default();
    if let Some(strategy) = &cli.strategy {
        settings.strategy = strategy.parse::<Strategy>()?;
    }
    if let Some(threshold) = cli.stand_threshold {
        settings.stand_threshold = threshold;
    }
    for raw in &cli.overrides {
        let (hand, dealer, action) = parse_override(raw)?;
        settings.overrides.insert(hand, dealer, action);
    }
    msg.settings = Some(settings);

    print_configuration(&rules);
    Ok(msg)
}

/// `HAND@DEALER=ACTION`
fn parse_override(raw: &str) -> anyhow::Result<(&str, &str, Action)> {
    let Some((target, action)) = raw.split_once('=') else {
        bail!("override '{raw}' is missing '=ACTION'");
    };
    let Some((hand, dealer)) = target.split_once('@') else {
        bail!("override '{raw}' is missing '@DEALER'");
    };
    Ok((hand, dealer, action.parse()?))
}

fn print_configuration(rules: &CasinoRules) {
    eprintln!("Configuration:");
    eprintln!("  Doubling:              {}", rules.doubling_mode);
    eprintln!("  Splitting:             {}", rules.split_options.allowed);
    eprintln!(
        "  Double after split:    {}",
        rules.split_options.double_after_split
    );
    eprintln!(
        "  Blackjack after split: {}",
        rules.split_options.blackjack_after_split
    );
    eprintln!(
        "  Hit split aces:        {}",
        rules.split_options.hit_split_aces
    );
    eprintln!(
        "  BJ payout:             {}",
        if rules.blackjack_payout { "3:2" } else { "1:1" }
    );
    eprintln!(
        "  Dealer soft 17:        {}",
        if rules.dealer_hits_soft_17 {
            "hits"
        } else {
            "stands"
        }
    );
}

fn print_json(value: serde_json::Value) {
    match serde_json::to_string_pretty(&value) {
        Ok(text) => println!("{text}"),
        Err(e) => log::error!("Cannot print response: {e}"),
    }
}

fn print_summary(snapshot: &Snapshot) {
    let summary = snapshot.summary();
    println!(
        "Strategy {}, dealer stands on {}",
        snapshot.settings().strategy,
        snapshot.settings().stand_threshold
    );
    println!(
        "Player return:  {:+.4}%",
        summary.outcome.advantage.payout * 100.0
    );
    println!("Per unit bet:   {:+.4}%", summary.return_per_unit * 100.0);
    println!("Turnover:       {:.4}", summary.turnover);
    println!(
        "Win/push/loss:  {:.4} / {:.4} / {:.4}",
        summary.outcome.win_probability,
        summary.outcome.push_probability,
        summary.outcome.loss_probability
    );
    println!();
    println!("{:>8} {:>8} {:>10} {:>8}", "up-card", "freq", "return", "turnover");
    for up in summary
        .by_up_card
        .iter()
        .chain(std::iter::once(&summary.against_average))
    {
        println!(
            "{:>8} {:>8.4} {:>+9.4}% {:>8.4}",
            up.up_card,
            up.frequency,
            up.outcome.advantage.payout * 100.0,
            up.turnover
        );
    }
}

fn print_dealer(snapshot: &Snapshot) {
    let cards = snapshot.cards();
    let threshold = snapshot.settings().stand_threshold;
    let mut columns: Vec<FinalScore> = (threshold..=MAX_SCORE).map(FinalScore::Total).collect();
    columns.push(FinalScore::Blackjack);
    columns.push(FinalScore::Bust);

    print!("{:>8}", "up-card");
    for score in &columns {
        print!(" {:>9}", score.to_string());
    }
    println!();
    for dealer in DealerRef::all(cards) {
        let key = dealer.key(cards);
        let Ok(dist) = snapshot.dealer_distribution(&key) else {
            continue;
        };
        print!("{key:>8}");
        for score in &columns {
            print!(" {:>9.6}", dist.mass(*score));
        }
        println!();
    }
}

fn print_strategy(snapshot: &Snapshot) {
    let cards = snapshot.cards();
    let dealers = DealerRef::all(cards);
    print!("{:>12}", "hand");
    for dealer in &dealers {
        print!(" {:>3}", short_key(&dealer.key(cards)));
    }
    println!();
    for hand in snapshot.graph().nodes() {
        if hand.is_single() || !hand.is_active {
            continue;
        }
        print!("{:>12}", hand.key.as_str());
        for dealer in &dealers {
            let cell = snapshot
                .decision(hand.key.as_str(), &dealer.key(cards))
                .map(|record| record.preferred().symbol())
                .unwrap_or("?");
            print!(" {cell:>3}");
        }
        println!();
    }
}

fn short_key(key: &str) -> &str {
    if key == blackjack::AVERAGE_KEY {
        "avg"
    } else {
        key
    }
}

fn print_decision(snapshot: &Snapshot, hand: &str, dealer: &str) -> anyhow::Result<()> {
    let record = snapshot.decision(hand, dealer)?;
    println!("{hand} vs {dealer}: {}", record.preferred());
    if let Some(action) = record.overridden {
        println!("  (forced {action}, strategy ranks {})", record.ranked[0]);
    }
    println!(
        "{:>8} {:>8} {:>8} {:>8} {:>9} {:>6}",
        "action", "win", "push", "loss", "return", "stake"
    );
    for action in &record.preferred_order {
        let Some(eval) = record.evaluation(*action) else {
            continue;
        };
        println!(
            "{:>8} {:>8.4} {:>8.4} {:>8.4} {:>+8.4}% {:>6.3}",
            action.name(),
            eval.outcome.win_probability,
            eval.outcome.push_probability,
            eval.outcome.loss_probability,
            eval.outcome.advantage.payout * 100.0,
            eval.stake
        );
    }
    Ok(())
}
