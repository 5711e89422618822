#[cfg(test)]
mod test_bayes_ball {
    use bayesnet::scenarios::ScenarioFactory;
    use bayesnet::{BayesBall, BayesError};

    fn check(scenario: &str, first: &str, second: &str, evidence: &[&str]) -> bool {
        let network = ScenarioFactory::build(scenario).unwrap();
        BayesBall::new(&network).is_independent(first, second, evidence).unwrap()
    }

    #[test]
    fn test_chain_blocking() {
        assert!(!check("chain", "A", "D", &[]));
        assert!(check("chain", "A", "D", &["B"]));
        assert!(check("chain", "A", "D", &["C"]));
        assert!(!check("chain", "B", "D", &["A"]));
    }

    #[test]
    fn test_alarm_common_effect_and_common_cause() {
        assert!(check("alarm", "B", "E", &[]));
        assert!(!check("alarm", "B", "E", &["A"]));
        assert!(!check("alarm", "B", "E", &["J"]));
        assert!(!check("alarm", "J", "M", &[]));
        assert!(check("alarm", "J", "M", &["A"]));
        assert!(check("alarm", "B", "J", &["A"]));
        assert!(!check("alarm", "B", "M", &["J"]));
    }

    #[test]
    fn test_sprinkler_paths() {
        assert!(check("sprinkler", "Sprinkler", "Rain", &["Cloudy"]));
        assert!(!check("sprinkler", "Sprinkler", "Rain", &["Cloudy", "WetGrass"]));
        assert!(!check("sprinkler", "Cloudy", "WetGrass", &[]));
        assert!(check("sprinkler", "Cloudy", "WetGrass", &["Sprinkler", "Rain"]));
        assert!(!check("sprinkler", "Cloudy", "WetGrass", &["Sprinkler"]));
    }

    #[test]
    fn test_network_convenience_matches_checker() {
        let network = ScenarioFactory::build("alarm").unwrap();
        assert!(network.is_independent("B", "E", &[] as &[&str]).unwrap());
        assert!(!network.is_independent("B", "E", &["M"]).unwrap());
    }

    #[test]
    fn test_symmetry_over_every_evidence_subset() {
        for name in ScenarioFactory::names() {
            let network = ScenarioFactory::build(name).unwrap();
            let ball = BayesBall::new(&network);
            let names: Vec<&str> = network.variables().iter().map(|v| v.name()).collect();
            for mask in 0..(1usize << names.len()) {
                let evidence: Vec<&str> = names
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1usize << *i) != 0)
                    .map(|(_, n)| *n)
                    .collect();
                for &x in &names {
                    for &y in &names {
                        assert_eq!(
                            ball.is_independent(x, y, &evidence).unwrap(),
                            ball.is_independent(y, x, &evidence).unwrap(),
                            "{name}: {x} vs {y} given {evidence:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_unknown_evidence_is_reported() {
        let network = ScenarioFactory::build("chain").unwrap();
        assert_eq!(
            BayesBall::new(&network).is_independent("A", "D", &["Q"]).unwrap_err(),
            BayesError::UnknownVariable("Q".to_string())
        );
    }
}
