//! # Genesis Builder
//!
//! Generates the network-wide trapdoor key pair, hands out trapdoor custody
//! and builds the genesis block every node starts from.

use rand::Rng;
use rc_01_ledger::Block;
use rc_02_node::Node;
use rc_05_redaction::TrapdoorCustody;
use shared_crypto::{split_secret, ChameleonHash, ChameleonKeyPair, GroupParams, KeyShare, TrapdoorHolder};
use shared_types::{NodeId, SimulationConfig, TrapdoorConfig};
use tracing::info;

use crate::errors::RuntimeResult;

/// Everything derived from the key ceremony.
#[derive(Debug)]
pub struct Genesis {
    /// Public hashing capability shared by all nodes.
    pub hasher: ChameleonHash,
    /// Height-0 block, identical on every node.
    pub block: Block,
    /// Nodes with their local chain at genesis and any key share.
    pub nodes: Vec<Node>,
    /// Who may forge, and how.
    pub custody: TrapdoorCustody,
}

/// Builds the genesis state from a validated configuration.
pub struct GenesisBuilder<'a> {
    config: &'a SimulationConfig,
    params: GroupParams,
}

impl<'a> GenesisBuilder<'a> {
    pub fn new(config: &'a SimulationConfig) -> Self {
        Self {
            config,
            params: GroupParams::simulation(),
        }
    }

    /// Run the key ceremony and build the node roster.
    ///
    /// With threshold custody the secret key is split into one Shamir share
    /// per holder and then dropped; no node ever holds the whole key.
    pub fn build<R: Rng + ?Sized>(self, rng: &mut R) -> RuntimeResult<Genesis> {
        let (hasher, secret_key) = ChameleonKeyPair::generate(self.params, rng).into_parts();
        let block = Block::genesis(&hasher)?;

        let mut nodes: Vec<Node> = self
            .config
            .nodes
            .iter()
            .enumerate()
            .map(|(index, spec)| Node::new(NodeId(index as u32), spec, block.clone()))
            .collect();

        let custody = match &self.config.redaction.trapdoor {
            TrapdoorConfig::CentralAuthority { authority } => {
                info!(authority = %authority, "Trapdoor held by central authority");
                TrapdoorCustody::Central {
                    authority: *authority,
                    holder: TrapdoorHolder::SingleAuthority { secret_key },
                }
            }
            TrapdoorConfig::Threshold { threshold, holders } => {
                let shares = split_secret(hasher.params(), &secret_key, *threshold, holders.len(), rng)?;
                distribute_shares(&mut nodes, holders, shares);
                info!(threshold, holders = holders.len(), "Trapdoor split among share holders");
                TrapdoorCustody::Threshold {
                    threshold: *threshold,
                    holders: holders.clone(),
                }
            }
        };

        info!(nodes = nodes.len(), genesis = %block.id, "Genesis built");
        Ok(Genesis {
            hasher,
            block,
            nodes,
            custody,
        })
    }
}

fn distribute_shares(nodes: &mut [Node], holders: &[NodeId], shares: Vec<KeyShare>) {
    for (holder, share) in holders.iter().zip(shares) {
        if let Some(node) = nodes.iter_mut().find(|n| n.id() == *holder) {
            node.set_key_share(share);
        }
    }
}
