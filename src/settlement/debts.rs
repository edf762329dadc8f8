//! Greedy conversion of balances into settling transfers

use tracing::debug;

use crate::settlement::balances::Balances;
use crate::types::*;

/// Round an amount to cents
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[derive(Debug)]
struct Position<'a> {
    participant_id: &'a str,
    remaining: f64,
}

/// Turn signed balances into transfers that zero every balance
///
/// The largest remaining debtor always pays the largest remaining creditor.
/// Both sides are sorted by descending magnitude with a stable sort, so
/// equal balances keep roster order and the output is reproducible. The
/// result has at most `debtors + creditors - 1` entries but is not
/// guaranteed to be the global minimum.
pub fn minimize_debts(balances: &Balances, epsilon: f64) -> Vec<Debt> {
    let mut debtors: Vec<Position<'_>> = balances
        .iter()
        .filter(|b| b.amount < -epsilon)
        .map(|b| Position {
            participant_id: &b.participant_id,
            remaining: -b.amount,
        })
        .collect();
    let mut creditors: Vec<Position<'_>> = balances
        .iter()
        .filter(|b| b.amount > epsilon)
        .map(|b| Position {
            participant_id: &b.participant_id,
            remaining: b.amount,
        })
        .collect();

    debtors.sort_by(|a, b| b.remaining.total_cmp(&a.remaining));
    creditors.sort_by(|a, b| b.remaining.total_cmp(&a.remaining));

    let mut debts = Vec::new();
    let mut di = 0;
    let mut ci = 0;

    while di < debtors.len() && ci < creditors.len() {
        let transfer = debtors[di].remaining.min(creditors[ci].remaining);
        if transfer > epsilon {
            debts.push(Debt {
                from: debtors[di].participant_id.to_string(),
                to: creditors[ci].participant_id.to_string(),
                amount: round_cents(transfer),
            });
        }

        debtors[di].remaining -= transfer;
        creditors[ci].remaining -= transfer;

        if debtors[di].remaining < epsilon {
            di += 1;
        }
        if creditors[ci].remaining < epsilon {
            ci += 1;
        }
    }

    debug!(
        debtors = debtors.len(),
        creditors = creditors.len(),
        transfers = debts.len(),
        "Debts minimized"
    );

    debts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::CurrencyNormalizer;
    use crate::settlement::balances::aggregate_balances;
    use chrono::Utc;

    fn balances_of(pairs: &[(&str, f64)]) -> Balances {
        let participants: Vec<Participant> = pairs
            .iter()
            .map(|(id, _)| Participant::new(*id, *id, ""))
            .collect();
        // One expense per non-zero balance against a sink keeps the roster order intact.
        let mut expenses = Vec::new();
        let sink = pairs[0].0;
        for (i, (id, amount)) in pairs.iter().enumerate().skip(1) {
            if *amount == 0.0 {
                continue;
            }
            let (payer, beneficiary, value) = if *amount > 0.0 {
                (*id, sink, *amount)
            } else {
                (sink, *id, -*amount)
            };
            expenses.push(Expense {
                id: format!("e{i}"),
                description: "adjustment".to_string(),
                amount: value,
                currency: Currency::Reference,
                paid_by: Payers::single(payer),
                split_between: vec![beneficiary.to_string()],
                date: Utc::now(),
                category: None,
                excluded_from_settlement: false,
                rates: None,
            });
        }
        aggregate_balances(&expenses, &participants, &CurrencyNormalizer::default())
            .unwrap()
            .balances
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(10.004), 10.0);
        assert_eq!(round_cents(10.006), 10.01);
        assert_eq!(round_cents(33.333333), 33.33);
    }

    #[test]
    fn test_single_pair() {
        // sink ends at +50 after paying for p2
        let balances = balances_of(&[("p1", 0.0), ("p2", -50.0)]);
        let debts = minimize_debts(&balances, 0.01);
        assert_eq!(
            debts,
            vec![Debt {
                from: "p2".to_string(),
                to: "p1".to_string(),
                amount: 50.0
            }]
        );
    }

    #[test]
    fn test_largest_debtor_pays_first() {
        // sink p1 ends at +50
        let balances = balances_of(&[("p1", 0.0), ("p2", -10.0), ("p3", -40.0)]);
        let debts = minimize_debts(&balances, 0.01);
        assert_eq!(debts.len(), 2);
        assert_eq!((debts[0].from.as_str(), debts[0].amount), ("p3", 40.0));
        assert_eq!((debts[1].from.as_str(), debts[1].amount), ("p2", 10.0));
    }

    #[test]
    fn test_ties_follow_roster_order() {
        let balances = balances_of(&[("p1", 0.0), ("p2", -30.0), ("p3", -30.0)]);
        let debts = minimize_debts(&balances, 0.01);
        assert_eq!(debts[0].from, "p2");
        assert_eq!(debts[1].from, "p3");
    }

    #[test]
    fn test_noise_below_epsilon_ignored() {
        let balances = balances_of(&[("p1", 0.0), ("p2", -0.004)]);
        assert!(minimize_debts(&balances, 0.01).is_empty());
    }

    #[test]
    fn test_split_across_creditors() {
        // sink p1 ends at -60
        let balances = balances_of(&[("p1", 0.0), ("p2", 40.0), ("p3", 20.0)]);
        let debts = minimize_debts(&balances, 0.01);
        assert_eq!(
            debts,
            vec![
                Debt {
                    from: "p1".to_string(),
                    to: "p2".to_string(),
                    amount: 40.0
                },
                Debt {
                    from: "p1".to_string(),
                    to: "p3".to_string(),
                    amount: 20.0
                },
            ]
        );
    }

    #[test]
    fn test_empty_balances() {
        assert!(minimize_debts(&Balances::default(), 0.01).is_empty());
    }
}
