use anyhow::{Result, bail};
use bayesnet::common::setup::{command, init_logging, options_from_matches};
use bayesnet::inference::query::{Answer, QueryLine, parse_query_line};
use bayesnet::{InferenceResult, VariableElimination, print_blue, print_green, print_red};
use clap::Arg;
use log::info;

const MAX_HIDDEN: usize = 8;

/// Every ordering of `items`, in lexicographic order of positions.
fn permutations(items: &[String]) -> Vec<Vec<String>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut result = Vec::new();
    for (i, first) in items.iter().enumerate() {
        let mut rest = items.to_vec();
        rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, first.clone());
            result.push(tail);
        }
    }
    result
}

fn main() -> Result<()> {
    init_logging();
    let matches = command()
        .name("ORDER_SWEEP")
        .about("Runs one elimination query under every order of its hidden variables.")
        .arg(
            Arg::new("query")
                .long("query")
                .value_name("QUERY")
                .help("Elimination query such as 'P(B=T|J=T,M=T)'")
                .required(true),
        )
        .get_matches();
    let config = options_from_matches(&matches);
    let text = matches.get_one::<String>("query").cloned().unwrap_or_default();

    let network = config.network_source()?.load()?;
    let QueryLine::Elimination(query) = parse_query_line(&text)? else {
        bail!("'{}' is not an elimination query", text);
    };

    let engine = VariableElimination::new(&network);
    let hidden = engine.hidden_variables(&query);
    if hidden.len() > MAX_HIDDEN {
        bail!(
            "{} hidden variables give too many orders to sweep (limit {})",
            hidden.len(),
            MAX_HIDDEN
        );
    }

    let baseline = engine.infer(&query)?;
    print_blue!("default order: {}", render(&baseline, config.precision));

    let orders = permutations(&hidden);
    info!("Sweeping {} orders of {:?}", orders.len(), hidden);
    let mut best: Option<(Vec<String>, InferenceResult)> = None;
    let mut disagreements = 0;
    for order in orders {
        let result = engine.infer(&query.clone().with_order(&order))?;
        println!("{:<24} {}", order.join("-"), render(&result, config.precision));
        if (result.probability - baseline.probability).abs() > 1e-9 {
            disagreements += 1;
        }
        let cost = result.additions + result.multiplications;
        if best
            .as_ref()
            .is_none_or(|(_, b)| cost < b.additions + b.multiplications)
        {
            best = Some((order, result));
        }
    }

    if disagreements > 0 {
        print_red!("{} orders disagree with the default answer", disagreements);
    }
    if let Some((order, result)) = best {
        print_green!("cheapest order: {} ({})", order.join("-"), render(&result, config.precision));
    }
    Ok(())
}

fn render(result: &InferenceResult, precision: usize) -> String {
    Answer::Elimination(*result).render(precision)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permutations_cover_every_order() {
        let items: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let all = permutations(&items);
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], ["A", "B", "C"]);
        assert_eq!(all[5], ["C", "B", "A"]);
        assert!(permutations(&[]).iter().all(|p| p.is_empty()));
    }
}
