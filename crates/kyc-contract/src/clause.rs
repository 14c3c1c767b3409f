//! # Verification Clause Engine
//!
//! A composable rule evaluator over transaction payloads. Clauses are
//! data — a small tagged-variant tree of combinators — evaluated by one
//! interpreter, not a class hierarchy behind virtual dispatch:
//!
//! - `Timestamp` — the transaction must carry a validity window.
//! - `Place` — the issuance rules for one linear-id group.
//! - `GroupByLinearId(inner)` — partitions all input and output states by
//!   linear id and evaluates `inner` once per group.
//! - `AllOf(clauses)` — every clause must succeed; results are the union.
//! - `FirstOf(clauses)` — the first clause whose required command is
//!   present is evaluated; later clauses are not tried.
//!
//! Evaluation is deterministic and side-effect-free. Both parties run the
//! identical composition over the identical payload, and an auditor
//! replaying the ledger gets the identical verdict.

use std::collections::BTreeSet;

use tracing::debug;

use kyc_core::LinearId;

use crate::error::{rules, ContractError};
use crate::state::LedgerState;
use crate::transaction::{CommandValue, TransactionPayload};

/// The command kinds a clause can claim to have validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CommandKind {
    /// The Place (issuance) intent.
    Place,
}

impl CommandKind {
    fn of(value: &CommandValue) -> Self {
        match value {
            CommandValue::Place { .. } => Self::Place,
        }
    }
}

/// All input and output states sharing one linear identifier.
///
/// Zero inputs and one output is an issuance; one input and one output is
/// an update. Anything else violates a Place rule.
#[derive(Debug)]
pub struct StateGroup<'a> {
    /// The shared linear id.
    pub linear_id: &'a LinearId,
    /// Consumed states in this group.
    pub inputs: Vec<&'a LedgerState>,
    /// Produced states in this group.
    pub outputs: Vec<&'a LedgerState>,
}

/// A verification clause: a pure predicate over a payload, or a
/// combinator over other clauses.
#[derive(Debug, Clone)]
pub enum Clause {
    /// Require a validity window on the transaction.
    Timestamp,
    /// The issuance rules, evaluated per group.
    Place,
    /// Partition states by linear id, evaluate the inner clause per group.
    GroupByLinearId(Box<Clause>),
    /// Every listed clause must succeed.
    AllOf(Vec<Clause>),
    /// Evaluate the first listed clause whose required command is present.
    FirstOf(Vec<Clause>),
}

impl Clause {
    /// The command kinds that make this clause selectable inside a
    /// `FirstOf` composition. Empty means always selectable.
    fn required_commands(&self) -> BTreeSet<CommandKind> {
        match self {
            Clause::Place => BTreeSet::from([CommandKind::Place]),
            _ => BTreeSet::new(),
        }
    }

    /// Evaluate this clause, returning the set of command kinds it
    /// validated.
    ///
    /// `group` is `Some` only beneath a `GroupByLinearId` combinator.
    fn evaluate(
        &self,
        tx: &TransactionPayload,
        group: Option<&StateGroup<'_>>,
    ) -> Result<BTreeSet<CommandKind>, ContractError> {
        match self {
            Clause::Timestamp => {
                if tx.time_window.is_none() {
                    return Err(ContractError::MissingTimestamp);
                }
                // Claims no commands; it constrains the envelope only.
                Ok(BTreeSet::new())
            }

            Clause::Place => verify_place(tx, group),

            Clause::GroupByLinearId(inner) => {
                let mut validated = BTreeSet::new();
                for g in group_by_linear_id(tx) {
                    debug!(linear_id = %g.linear_id, inputs = g.inputs.len(), outputs = g.outputs.len(), "evaluating group");
                    validated.extend(inner.evaluate(tx, Some(&g))?);
                }
                Ok(validated)
            }

            Clause::AllOf(clauses) => {
                let mut validated = BTreeSet::new();
                for clause in clauses {
                    validated.extend(clause.evaluate(tx, group)?);
                }
                Ok(validated)
            }

            Clause::FirstOf(clauses) => {
                let present: BTreeSet<CommandKind> = tx
                    .commands
                    .iter()
                    .map(|c| CommandKind::of(&c.value))
                    .collect();
                for clause in clauses {
                    let needed = clause.required_commands();
                    if needed.is_empty() || needed.iter().any(|k| present.contains(k)) {
                        // First match wins; later clauses are not tried.
                        return clause.evaluate(tx, group);
                    }
                }
                Err(ContractError::Violation(rules::UNMATCHED_COMMANDS))
            }
        }
    }
}

/// The issuance rules for one group.
fn verify_place(
    tx: &TransactionPayload,
    group: Option<&StateGroup<'_>>,
) -> Result<BTreeSet<CommandKind>, ContractError> {
    let group = group.ok_or(ContractError::Violation(rules::UNMATCHED_COMMANDS))?;

    let mut place_commands = tx.commands.iter().filter(|c| c.is_place());
    let command = match (place_commands.next(), place_commands.next()) {
        (Some(cmd), None) => cmd,
        _ => return Err(ContractError::Violation(rules::SINGLE_PLACE_COMMAND)),
    };

    if !group.inputs.is_empty() {
        return Err(ContractError::Violation(rules::NO_INPUTS_ON_ISSUE));
    }
    let out = match group.outputs.as_slice() {
        [single] => single,
        _ => return Err(ContractError::Violation(rules::SINGLE_OUTPUT_PER_GROUP)),
    };
    if out.buyer == out.seller {
        return Err(ContractError::Violation(rules::DISTINCT_PARTIES));
    }
    let all_participants_sign = out
        .participants()
        .iter()
        .all(|key| command.signers.contains(key));
    if !all_participants_sign {
        return Err(ContractError::Violation(rules::PARTICIPANTS_MUST_SIGN));
    }

    Ok(BTreeSet::from([CommandKind::Place]))
}

/// Partition all input and output states by linear id, preserving the
/// order of first appearance.
fn group_by_linear_id(tx: &TransactionPayload) -> Vec<StateGroup<'_>> {
    let mut groups: Vec<StateGroup<'_>> = Vec::new();

    fn find_or_insert<'a>(groups: &mut Vec<StateGroup<'a>>, linear_id: &'a LinearId) -> usize {
        match groups.iter().position(|g| g.linear_id == linear_id) {
            Some(i) => i,
            None => {
                groups.push(StateGroup {
                    linear_id,
                    inputs: Vec::new(),
                    outputs: Vec::new(),
                });
                groups.len() - 1
            }
        }
    }

    for consumed in &tx.inputs {
        let i = find_or_insert(&mut groups, &consumed.state.linear_id);
        groups[i].inputs.push(&consumed.state);
    }
    for output in &tx.outputs {
        let i = find_or_insert(&mut groups, &output.linear_id);
        groups[i].outputs.push(output);
    }
    groups
}

/// The composed contract verification run by both negotiation roles.
///
/// `AllOf(Timestamp, GroupByLinearId(FirstOf(Place)))`, followed by a
/// coverage check: every command on the transaction must have been
/// validated by some clause.
pub fn verify_transaction(tx: &TransactionPayload) -> Result<(), ContractError> {
    let composition = Clause::AllOf(vec![
        Clause::Timestamp,
        Clause::GroupByLinearId(Box::new(Clause::FirstOf(vec![Clause::Place]))),
    ]);
    let validated = composition.evaluate(tx, None)?;

    let present: BTreeSet<CommandKind> = tx
        .commands
        .iter()
        .map(|c| CommandKind::of(&c.value))
        .collect();
    if !present.is_subset(&validated) {
        return Err(ContractError::Violation(rules::UNMATCHED_COMMANDS));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::KycRecord;
    use crate::state::Party;
    use crate::transaction::{build_agreement, Command, ConsumedState, StateRef, TransactionId};
    use kyc_core::{ContentDigest, TimeWindow, Timestamp};
    use kyc_crypto::Ed25519KeyPair;

    fn party(name: &str, seed: u8) -> Party {
        Party::new(name, Ed25519KeyPair::from_seed(&[seed; 32]).public_key())
    }

    fn record() -> KycRecord {
        KycRecord::new(
            111,
            "biksen",
            "Jiya Sen",
            "2017-02-09".parse().unwrap(),
            "2019-09-15".parse().unwrap(),
            "A001",
        )
    }

    fn window() -> TimeWindow {
        TimeWindow::new(Timestamp::parse("2026-01-15T12:00:00Z").unwrap(), 30)
    }

    fn valid_payload() -> TransactionPayload {
        let state = LedgerState::issue(record(), party("BankA", 1), party("BankB", 2)).unwrap();
        build_agreement(state, party("Notary", 3), None).with_time_window(window())
    }

    #[test]
    fn valid_issuance_verifies() {
        verify_transaction(&valid_payload()).expect("well-formed issuance passes");
    }

    #[test]
    fn missing_window_is_missing_timestamp() {
        let mut tx = valid_payload();
        tx.time_window = None;
        assert_eq!(verify_transaction(&tx).unwrap_err(), ContractError::MissingTimestamp);
    }

    #[test]
    fn inputs_on_issue_rejected() {
        let mut tx = valid_payload();
        let consumed = tx.outputs[0].clone();
        tx.inputs.push(ConsumedState {
            state_ref: StateRef {
                tx_id: TransactionId(ContentDigest::of_bytes(b"prior")),
                index: 0,
            },
            state: consumed,
        });
        assert_eq!(
            verify_transaction(&tx).unwrap_err(),
            ContractError::Violation(rules::NO_INPUTS_ON_ISSUE)
        );
    }

    #[test]
    fn two_outputs_in_one_group_rejected() {
        let mut tx = valid_payload();
        let duplicate = tx.outputs[0].clone();
        tx.outputs.push(duplicate);
        assert_eq!(
            verify_transaction(&tx).unwrap_err(),
            ContractError::Violation(rules::SINGLE_OUTPUT_PER_GROUP)
        );
    }

    #[test]
    fn input_only_group_rejected() {
        // A linear id appearing only in inputs forms a group with zero
        // outputs, which the Place clause never satisfies.
        let other = LedgerState::issue(record(), party("BankA", 1), party("BankB", 2)).unwrap();
        let mut tx = valid_payload();
        tx.inputs.push(ConsumedState {
            state_ref: StateRef {
                tx_id: TransactionId(ContentDigest::of_bytes(b"prior")),
                index: 0,
            },
            state: other,
        });
        assert!(matches!(
            verify_transaction(&tx).unwrap_err(),
            ContractError::Violation(_)
        ));
    }

    #[test]
    fn self_dealing_output_rejected() {
        let same = party("BankA", 1);
        let mut tx = valid_payload();
        tx.outputs[0].buyer = same.clone();
        tx.outputs[0].seller = same;
        assert_eq!(
            verify_transaction(&tx).unwrap_err(),
            ContractError::Violation(rules::DISTINCT_PARTIES)
        );
    }

    #[test]
    fn missing_participant_signer_rejected() {
        let mut tx = valid_payload();
        // Drop the seller's key from the signer set.
        tx.commands[0].signers.truncate(1);
        assert_eq!(
            verify_transaction(&tx).unwrap_err(),
            ContractError::Violation(rules::PARTICIPANTS_MUST_SIGN)
        );
    }

    #[test]
    fn duplicate_place_commands_rejected() {
        let mut tx = valid_payload();
        let extra = Command::place(tx.outputs[0].participants());
        tx.commands.push(extra);
        assert_eq!(
            verify_transaction(&tx).unwrap_err(),
            ContractError::Violation(rules::SINGLE_PLACE_COMMAND)
        );
    }

    #[test]
    fn two_independent_groups_both_verified() {
        // Two unrelated issuances in one transaction: each group passes
        // its own Place evaluation. A single shared Place command lists
        // the union of participants.
        let state_a = LedgerState::issue(record(), party("BankA", 1), party("BankB", 2)).unwrap();
        let mut rec_b = record();
        rec_b.kyc_id = 222;
        let state_b = LedgerState::issue(rec_b, party("BankA", 1), party("BankC", 4)).unwrap();

        let mut signers = state_a.participants();
        signers.extend(state_b.participants());
        let tx = TransactionPayload {
            inputs: Vec::new(),
            outputs: vec![state_a, state_b],
            commands: vec![Command::place(signers)],
            time_window: Some(window()),
            notary: party("Notary", 3),
            attachment: None,
        };
        verify_transaction(&tx).expect("both groups satisfy Place");
    }

    #[test]
    fn verification_is_rerunnable() {
        let tx = valid_payload();
        verify_transaction(&tx).unwrap();
        verify_transaction(&tx).unwrap();
    }
}
