//! # End-to-End Flows
//!
//! Full simulation runs through `Simulation::run`, checked via the
//! `RunReport` and the final node state:
//!
//! - every node's chain verifies after a run with redactions enabled
//! - the same seed produces the same report
//! - a scheduled redaction executes and reaches every node
//! - threshold custody executes with enough holder approvals and rejects
//!   without them; concurrent redactions of one block converge
//! - requests outside every policy are refused at submission and archived
//!   as REJECTED

#[cfg(test)]
mod tests {
    use node_runtime::{RunReport, Simulation};
    use rc_05_redaction::RedactionStatus;
    use shared_types::{NodeId, RedactionKind, ScheduledRedaction, SimulationConfig, TrapdoorConfig};

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn base_config(seed: u64) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.seed = seed;
        config.end_time = 3_000_000;
        config
    }

    /// Default roster (ADMIN, REGULATOR, MINER, MINER, USER, OBSERVER),
    /// no on-chain requests, every vote approves, one DELETE submitted by
    /// `requester` against height 2.
    fn scheduled_delete(seed: u64, requester: NodeId) -> SimulationConfig {
        let mut config = base_config(seed);
        config.workload.redaction_request_ratio = 0.0;
        config.redaction.approval_probability = 1.0;
        config.redaction.scheduled = vec![ScheduledRedaction {
            at: 1_000_000,
            requester,
            target_height: 2,
            tx_index: 1,
            kind: RedactionKind::Delete,
            reason: "GDPR erasure".into(),
        }];
        config
    }

    fn run(config: SimulationConfig) -> (Simulation, RunReport) {
        let mut sim = Simulation::new(config).unwrap();
        let report = sim.run().unwrap();
        (sim, report)
    }

    fn count(report: &RunReport, status: RedactionStatus) -> usize {
        report
            .redaction
            .as_ref()
            .and_then(|r| r.by_status.get(&status).copied())
            .unwrap_or(0)
    }

    // =========================================================================
    // WHOLE-RUN PROPERTIES
    // =========================================================================

    #[test]
    fn test_default_run_keeps_every_chain_valid() {
        let (_, report) = run(base_config(7));

        assert!(report.integrity_ok(), "integrity failures: {:?}", report.nodes);
        assert_eq!(report.miner_sequence.len(), 10);
        assert!(report.max_height() >= 9);
        assert!(report.transactions_generated > 0);
        assert!(report.redaction.is_some());
    }

    #[test]
    fn test_same_seed_same_report() {
        let (_, first) = run(base_config(99));
        let (_, second) = run(base_config(99));
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn test_disabled_redaction_reports_none() {
        let mut config = scheduled_delete(3, NodeId(0));
        config.redaction.enabled = false;
        let (sim, report) = run(config);

        assert!(report.redaction.is_none());
        assert!(sim.container().redaction.is_none());
        assert!(report.nodes.iter().all(|n| n.redacted_blocks == 0));
    }

    // =========================================================================
    // CENTRAL AUTHORITY
    // =========================================================================

    #[test]
    fn test_scheduled_delete_reaches_every_node() {
        let (sim, report) = run(scheduled_delete(11, NodeId(1)));

        assert_eq!(count(&report, RedactionStatus::Executed), 1);
        assert!(report.integrity_ok());
        assert!(report.nodes.iter().all(|n| n.redacted_blocks == 1));

        let container = sim.container();
        let reference = container.nodes[0].chain().get_by_height(2).unwrap();
        assert_eq!(reference.redaction_history.len(), 1);
        assert_eq!(reference.redaction_history[0].kind, RedactionKind::Delete);
        for node in &container.nodes {
            let block = node.chain().get_by_height(2).unwrap();
            assert_eq!(block, reference);
            assert_eq!(block.hash(), node.chain().get_by_height(3).map(|b| &b.previous_id).unwrap());
        }

        let request = &report.redaction.as_ref().unwrap().requests[0];
        assert_eq!(request.requester, NodeId(1));
        assert_eq!(request.policy.as_deref(), Some("GDPR_COMPLIANCE"));
        assert_eq!(request.approvals, 2);
    }

    #[test]
    fn test_request_outside_policy_is_refused() {
        // MINER may not request DELETE under GDPR_COMPLIANCE
        let (_, report) = run(scheduled_delete(5, NodeId(2)));
        let redaction = report.redaction.as_ref().unwrap();

        assert_eq!(redaction.refused_at_submission, 1);
        assert_eq!(count(&report, RedactionStatus::Rejected), 1);
        let request = &redaction.requests[0];
        assert_eq!(request.requester, NodeId(2));
        assert_eq!(request.status, RedactionStatus::Rejected);
        assert_eq!(request.approvals, 0);
        assert!(request.outcome.as_deref().unwrap_or_default().starts_with("Policy violation"));
        assert!(report.nodes.iter().all(|n| n.redacted_blocks == 0));
    }

    #[test]
    fn test_expiry_when_nobody_votes() {
        let mut config = scheduled_delete(8, NodeId(0));
        config.redaction.approval_probability = 0.0;
        config.redaction.approval_window = 600_000;
        let (_, report) = run(config);

        assert_eq!(count(&report, RedactionStatus::Expired), 1);
        let redaction = report.redaction.as_ref().unwrap();
        assert!(redaction.votes_abstained > 0);
        assert!(report.nodes.iter().all(|n| n.redacted_blocks == 0));
    }

    // =========================================================================
    // THRESHOLD CUSTODY
    // =========================================================================

    #[test]
    fn test_threshold_redaction_executes_on_lowest_holder() {
        let mut config = scheduled_delete(13, NodeId(1));
        config.redaction.trapdoor = TrapdoorConfig::Threshold {
            threshold: 2,
            holders: vec![NodeId(0), NodeId(1), NodeId(2)],
        };
        let (sim, report) = run(config);

        assert_eq!(count(&report, RedactionStatus::Executed), 1);
        assert!(report.integrity_ok());
        assert!(report.nodes.iter().all(|n| n.redacted_blocks == 1));
        assert!(sim.container().nodes[0].key_share().is_some());
        assert!(sim.container().nodes[4].key_share().is_none());

        let block = sim.container().nodes[0].chain().get_by_height(2).unwrap();
        assert_eq!(block.redaction_history[0].requester, NodeId(1));
    }

    #[test]
    fn test_concurrent_threshold_redactions_converge() {
        let mut config = scheduled_delete(19, NodeId(0));
        let mut second = config.redaction.scheduled[0].clone();
        second.requester = NodeId(1);
        second.tx_index = 2;
        config.redaction.scheduled.push(second);
        config.redaction.trapdoor = TrapdoorConfig::Threshold {
            threshold: 2,
            holders: vec![NodeId(0), NodeId(1), NodeId(2)],
        };
        let (sim, report) = run(config);

        assert_eq!(count(&report, RedactionStatus::Executed), 2);
        assert!(report.integrity_ok());

        let container = sim.container();
        let reference = container.nodes[0].chain().get_by_height(2).unwrap();
        let requesters: Vec<NodeId> = reference.redaction_history.iter().map(|r| r.requester).collect();
        assert_eq!(requesters, vec![NodeId(0), NodeId(1)]);
        for node in &container.nodes {
            assert_eq!(node.chain().get_by_height(2).unwrap(), reference);
        }
    }

    #[test]
    fn test_threshold_rejects_without_enough_holder_approvals() {
        // Only node 0 is both a holder and an eligible approver
        let mut config = scheduled_delete(17, NodeId(0));
        config.redaction.trapdoor = TrapdoorConfig::Threshold {
            threshold: 2,
            holders: vec![NodeId(0), NodeId(2), NodeId(3)],
        };
        let (_, report) = run(config);

        assert_eq!(count(&report, RedactionStatus::Rejected), 1);
        let request = &report.redaction.as_ref().unwrap().requests[0];
        assert!(request.outcome.as_deref().unwrap_or_default().contains("1 of 2"));
        assert!(report.integrity_ok());
        assert!(report.nodes.iter().all(|n| n.redacted_blocks == 0));
    }
}
