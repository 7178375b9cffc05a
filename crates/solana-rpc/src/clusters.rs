//! One gateway per cluster

use std::sync::Arc;
use tracing::info;
use wallet_core::{Network, Settings};

use crate::client::HttpRpcClient;
use crate::confirm::ConfirmConfig;
use crate::error::RpcResult;
use crate::gateway::RpcGateway;

/// Gateways for mainnet and devnet plus the confirmation policy
#[derive(Clone)]
pub struct ClusterClients {
    mainnet: Arc<dyn RpcGateway>,
    devnet: Arc<dyn RpcGateway>,
    confirm: ConfirmConfig,
}

impl ClusterClients {
    pub fn new(
        mainnet: Arc<dyn RpcGateway>,
        devnet: Arc<dyn RpcGateway>,
        confirm: ConfirmConfig,
    ) -> Self {
        Self {
            mainnet,
            devnet,
            confirm,
        }
    }

    /// Build HTTP clients for both clusters from settings
    pub fn from_settings(settings: &Settings) -> RpcResult<Self> {
        let build = |network: Network| -> RpcResult<Arc<dyn RpcGateway>> {
            let url = settings.endpoint(network);
            info!("{} RPC endpoint: {}", network.label(), url);
            Ok(Arc::new(HttpRpcClient::new(
                url,
                settings.commitment,
                settings.request_timeout(),
            )?))
        };

        Ok(Self::new(
            build(Network::Mainnet)?,
            build(Network::Devnet)?,
            ConfirmConfig::from_settings(settings),
        ))
    }

    pub fn gateway(&self, network: Network) -> Arc<dyn RpcGateway> {
        match network {
            Network::Mainnet => self.mainnet.clone(),
            Network::Devnet => self.devnet.clone(),
        }
    }

    pub fn confirm_config(&self) -> &ConfirmConfig {
        &self.confirm
    }
}
