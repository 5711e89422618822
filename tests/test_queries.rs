#[cfg(test)]
mod test_queries {
    use std::fs;
    use std::path::Path;

    use bayesnet::BayesError;
    use bayesnet::inference::query::{Answer, answer, parse_queries, parse_query_line};
    use bayesnet::scenarios::ScenarioFactory;

    #[test]
    fn test_alarm_query_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("alarm_queries.txt");
        let text = fs::read_to_string(path).unwrap();
        let network = ScenarioFactory::build("alarm").unwrap();

        let rendered: Vec<String> = parse_queries(&text)
            .unwrap()
            .iter()
            .map(|line| answer(&network, line).unwrap().render(5))
            .collect();
        assert_eq!(
            rendered,
            vec![
                "0.28417,7,16",
                "0.28417,7,16",
                "0.84902,15,32",
                "0.84902,7,10",
                "yes",
                "no",
                "yes",
            ]
        );
    }

    #[test]
    fn test_json_answer() {
        let network = ScenarioFactory::build("chain").unwrap();
        let line = parse_query_line("P(D=T|A=T) B-C").unwrap();
        let value: serde_json::Value = serde_json::to_value(answer(&network, &line).unwrap()).unwrap();
        assert_eq!(value["kind"], "elimination");
        assert_eq!(value["additions"], 5);
        assert_eq!(value["multiplications"], 8);
        assert!((value["probability"].as_f64().unwrap() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_names_surface_as_errors() {
        let network = ScenarioFactory::build("chain").unwrap();
        for text in ["P(Z=T)", "A-Z|", "A-D|Z=T"] {
            let line = parse_query_line(text).unwrap();
            assert_eq!(
                answer(&network, &line).unwrap_err(),
                BayesError::UnknownVariable("Z".to_string()),
                "{text}"
            );
        }
        let line = parse_query_line("P(A=maybe)").unwrap();
        assert!(matches!(answer(&network, &line), Err(BayesError::UnknownOutcome { .. })));
    }

    #[test]
    fn test_precision_is_configurable() {
        let network = ScenarioFactory::build("chain").unwrap();
        let line = parse_query_line("P(A=T|D=T)").unwrap();
        let result = answer(&network, &line).unwrap();
        assert_eq!(result.render(3), "0.667,7,20");
        assert!(matches!(result, Answer::Elimination(_)));
    }
}
