use std::collections::VecDeque;

use log::trace;

use crate::common::errors::Result;
use crate::model::network::BayesianNetwork;

/// Direction a ball travelled to reach a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arrival {
    FromChild,
    FromParent,
}

#[derive(Debug, Clone, Copy, Default)]
struct BallState {
    shaded: bool,
    visited_from_child: bool,
    visited_from_parent: bool,
}

impl BallState {
    /// Marks the arrival and reports whether it is new.
    fn visit(&mut self, arrival: Arrival) -> bool {
        let flag = match arrival {
            Arrival::FromChild => &mut self.visited_from_child,
            Arrival::FromParent => &mut self.visited_from_parent,
        };
        !std::mem::replace(flag, true)
    }
}

/// D-separation checks by passing balls through the network graph.
pub struct BayesBall<'a> {
    network: &'a BayesianNetwork,
}

impl<'a> BayesBall<'a> {
    pub fn new(network: &'a BayesianNetwork) -> Self {
        BayesBall { network }
    }

    /// Whether `start` and `destination` are conditionally independent given
    /// the observed variables. Evidence is named only; values play no part.
    ///
    /// # Errors
    /// * `BayesError::UnknownVariable` for any name missing from the network
    pub fn is_independent<S: AsRef<str>>(
        &self,
        start: &str,
        destination: &str,
        evidence: &[S],
    ) -> Result<bool> {
        let from = self.network.require_index(start)?;
        let to = self.network.require_index(destination)?;

        let mut states = vec![BallState::default(); self.network.len()];
        for name in evidence {
            states[self.network.require_index(name.as_ref())?].shaded = true;
        }

        if from == to {
            return Ok(false);
        }
        if states[from].shaded || states[to].shaded {
            return Ok(true);
        }

        let mut pending = VecDeque::from([(from, Arrival::FromChild)]);
        while let Some((node, arrival)) = pending.pop_front() {
            if !states[node].visit(arrival) {
                continue;
            }
            if node == to {
                trace!("BayesBall - reached {} from {}", destination, start);
                return Ok(false);
            }

            let shaded = states[node].shaded;
            let parents = self.network.parent_indices(node);
            let children = self.network.child_indices(node);
            match (shaded, arrival) {
                (false, Arrival::FromChild) => {
                    pending.extend(parents.iter().map(|&p| (p, Arrival::FromChild)));
                    pending.extend(children.iter().map(|&c| (c, Arrival::FromParent)));
                }
                (false, Arrival::FromParent) => {
                    pending.extend(children.iter().map(|&c| (c, Arrival::FromParent)));
                }
                (true, Arrival::FromParent) => {
                    pending.extend(parents.iter().map(|&p| (p, Arrival::FromChild)));
                }
                (true, Arrival::FromChild) => {}
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::BayesError;

    const TF: [&str; 2] = ["T", "F"];
    const NONE: [&str; 0] = [];

    /// A -> B -> C
    fn chain() -> BayesianNetwork {
        BayesianNetwork::builder()
            .variable("A", &TF, &[], &[0.5, 0.5])
            .variable("B", &TF, &["A"], &[0.5, 0.5, 0.5, 0.5])
            .variable("C", &TF, &["B"], &[0.5, 0.5, 0.5, 0.5])
            .build()
            .unwrap()
    }

    /// A -> C <- B, C -> D
    fn collider() -> BayesianNetwork {
        BayesianNetwork::builder()
            .variable("A", &TF, &[], &[0.5, 0.5])
            .variable("B", &TF, &[], &[0.5, 0.5])
            .variable("C", &TF, &["A", "B"], &[0.5; 8])
            .variable("D", &TF, &["C"], &[0.5, 0.5, 0.5, 0.5])
            .build()
            .unwrap()
    }

    #[test]
    fn test_chain_is_blocked_by_middle() {
        let network = chain();
        let ball = BayesBall::new(&network);
        assert!(!ball.is_independent("A", "C", &NONE).unwrap());
        assert!(ball.is_independent("A", "C", &["B"]).unwrap());
    }

    #[test]
    fn test_collider_opens_when_observed() {
        let network = collider();
        let ball = BayesBall::new(&network);
        assert!(ball.is_independent("A", "B", &NONE).unwrap());
        assert!(!ball.is_independent("A", "B", &["C"]).unwrap());
        // a descendant of the collider opens it as well
        assert!(!ball.is_independent("A", "B", &["D"]).unwrap());
    }

    #[test]
    fn test_same_node_is_dependent() {
        let network = chain();
        assert!(!BayesBall::new(&network).is_independent("B", "B", &NONE).unwrap());
    }

    #[test]
    fn test_observed_endpoint_is_independent() {
        let network = chain();
        let ball = BayesBall::new(&network);
        assert!(ball.is_independent("A", "C", &["A"]).unwrap());
        assert!(ball.is_independent("A", "C", &["C"]).unwrap());
    }

    #[test]
    fn test_unknown_names_are_errors() {
        let network = chain();
        let ball = BayesBall::new(&network);
        assert_eq!(
            ball.is_independent("A", "Z", &NONE).unwrap_err(),
            BayesError::UnknownVariable("Z".to_string())
        );
        assert!(ball.is_independent("Z", "A", &NONE).is_err());
        assert!(ball.is_independent("A", "C", &["Z"]).is_err());
    }

    #[test]
    fn test_unknown_names_never_alias_the_first_variable() {
        let network = chain();
        let ball = BayesBall::new(&network);
        // "A" sits at index 0; an unknown name must not stand in for it
        assert_eq!(
            ball.is_independent("Z", "Z", &NONE).unwrap_err(),
            BayesError::UnknownVariable("Z".to_string())
        );
        assert_eq!(
            ball.is_independent("B", "C", &["A", "Q"]).unwrap_err(),
            BayesError::UnknownVariable("Q".to_string())
        );
    }
}
