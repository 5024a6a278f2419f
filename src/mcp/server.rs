//! MCP server implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy::primitives::{Address, TxHash};
use rmcp::{
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{Implementation, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

use crate::{
    config::Config,
    error::AppError,
    evm::{Account, EvmClient, WalletSession},
    services::{ChainRegistry, Dex, DexAdapter},
    types::{parse_units, PairInfo, QuoteResult, Route, SwapParams, SwapStatus, Token},
};

/// Multichain DEX MCP Server.
///
/// Provides tools for quoting, routing and executing swaps on the configured chains.
#[derive(Clone)]
pub struct MultichainDexServer {
    registry: Arc<ChainRegistry>,
    dexes: Arc<BTreeMap<u64, DexAdapter>>,
    session: WalletSession,
    default_slippage: Decimal,
    deadline_minutes: u64,
    tool_router: ToolRouter<Self>,
}

impl MultichainDexServer {
    /// Create a new server.
    ///
    /// Note: This uses lazy initialization - no network calls are made during
    /// server startup. Each RPC connection is established when the first
    /// tool touching that chain is invoked.
    pub fn new(config: Config, registry: Arc<ChainRegistry>) -> Result<Self, AppError> {
        tracing::info!("Initializing Multichain DEX MCP Server");

        let session = WalletSession::new();
        match &config.private_key {
            Some(key) => session.connect(Account::from_private_key(key)?),
            None => tracing::warn!("WALLET_PRIVATE_KEY not set, swaps are disabled"),
        }

        for chain_id in config.rpc_urls.keys() {
            registry.chain(*chain_id)?;
        }

        let mut dexes = BTreeMap::new();
        for chain in registry.chains() {
            let mut dex =
                DexAdapter::new(registry.clone(), chain.chain_id)?.with_session(session.clone());

            if let Some(rpc_url) = config.rpc_urls.get(&chain.chain_id) {
                // Initialize EVM client (lazy - no network call yet)
                let client = Arc::new(EvmClient::new(rpc_url, chain.chain_id)?);
                dex = dex.with_reader(client.clone()).with_writer(client);
            }

            tracing::info!(
                chain_id = chain.chain_id,
                dex = %chain.dex_name,
                connected = dex.has_client(),
                "DEX adapter ready"
            );
            dexes.insert(chain.chain_id, dex);
        }

        tracing::info!("Multichain DEX MCP Server initialized successfully");

        Ok(Self {
            registry,
            dexes: Arc::new(dexes),
            session,
            default_slippage: config.default_slippage,
            deadline_minutes: config.deadline_minutes,
            tool_router: Self::tool_router(),
        })
    }

    fn dex(&self, chain_id: u64) -> Result<&DexAdapter, McpError> {
        self.dexes.get(&chain_id).ok_or_else(|| AppError::UnknownChain(chain_id).into())
    }

    /// Resolve both sides of a trade and reject identical tokens.
    async fn resolve_pair(
        &self,
        dex: &DexAdapter,
        token_in: &str,
        token_out: &str,
    ) -> Result<(Token, Token), McpError> {
        let token_in = dex.resolve_token(token_in).await?;
        let token_out = dex.resolve_token(token_out).await?;

        if token_in == token_out {
            return Err(McpError::invalid_params("token_in and token_out cannot be the same", None));
        }
        Ok((token_in, token_out))
    }

    /// Registry symbols of a route, falling back to the address.
    fn route_symbols(&self, chain_id: u64, route: &Route) -> Vec<String> {
        route
            .path()
            .iter()
            .map(|addr| match self.registry.token_by_address(chain_id, *addr) {
                Some(token) => token.symbol.clone(),
                None => format!("{:?}", addr),
            })
            .collect()
    }
}

/// Input parameters for the get_quote tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct GetQuoteInput {
    /// Chain ID (1 Ethereum, 56 BNB Smart Chain, 43114 Avalanche).
    pub chain_id: u64,
    /// Input token: symbol (e.g., "USDC"), "native", or address (0x...).
    pub token_in: String,
    /// Output token: symbol, "native", or address.
    pub token_out: String,
    /// Amount to sell (human-readable, e.g., "1.5").
    pub amount: String,
}

/// Input parameters for the get_swap_route tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct GetSwapRouteInput {
    /// Chain ID.
    pub chain_id: u64,
    /// Input token: symbol, "native", or address.
    pub token_in: String,
    /// Output token: symbol, "native", or address.
    pub token_out: String,
}

/// Input parameters for the get_pair_info tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct GetPairInfoInput {
    /// Chain ID.
    pub chain_id: u64,
    /// First token: symbol, "native", or address.
    pub token_a: String,
    /// Second token: symbol, "native", or address.
    pub token_b: String,
}

/// Input parameters for the is_token_supported tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct IsTokenSupportedInput {
    /// Chain ID.
    pub chain_id: u64,
    /// Token symbol or address.
    pub token: String,
}

/// Input parameters for the swap_tokens tool.
#[derive(Debug, Clone, serde::Deserialize, schemars::JsonSchema)]
pub struct SwapTokensInput {
    /// Chain ID.
    pub chain_id: u64,
    /// Input token: symbol, "native", or address.
    pub token_in: String,
    /// Output token: symbol, "native", or address.
    pub token_out: String,
    /// Amount to sell (human-readable, e.g., "1.5").
    pub amount: String,
    /// Slippage tolerance percentage as string (e.g., "0.5" for 0.5%). Defaults to the
    /// server's DEFAULT_SLIPPAGE.
    #[serde(default)]
    pub slippage_tolerance: Option<String>,
    /// Recipient of the output tokens. Defaults to the signing account.
    #[serde(default)]
    pub recipient: Option<String>,
    /// Wait for the transaction to be mined before returning.
    #[serde(default)]
    pub wait_for_confirmation: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DexSummary {
    chain_id: u64,
    chain: String,
    name: String,
    router: Address,
    factory: Address,
    native_symbol: String,
    rpc_configured: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResponse {
    chain_id: u64,
    dex: String,
    token_in: Token,
    token_out: Token,
    amount_in: String,
    route_symbols: Vec<String>,
    #[serde(flatten)]
    quote: QuoteResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RouteResponse {
    chain_id: u64,
    found: bool,
    hops: usize,
    route: Route,
    route_symbols: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PairInfoResponse {
    chain_id: u64,
    exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pair: Option<PairInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenSupportResponse {
    chain_id: u64,
    token: String,
    supported: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwapResponse {
    chain_id: u64,
    tx_hash: TxHash,
    from: Address,
    amount_in: String,
    expected_amount_out: String,
    amount_out_min: String,
    slippage_tolerance: Decimal,
    deadline: u64,
    route: Route,
    status: SwapStatus,
}

/// Parse and validate an EVM address from a string.
///
/// Validates:
/// - Address format (0x + 40 hex characters)
/// - Basic format checks
///
/// # Arguments
/// * `s` - The address string to parse (with 0x prefix)
///
/// # Returns
/// * `Ok(Address)` - If the address is valid
/// * `Err(McpError)` - If the address is invalid with a descriptive error
fn parse_address(s: &str) -> Result<Address, McpError> {
    let trimmed = s.trim();

    // Check for empty input
    if trimmed.is_empty() {
        return Err(McpError::invalid_params("Address cannot be empty", None));
    }

    // Check for correct prefix
    if !trimmed.starts_with("0x") && !trimmed.starts_with("0X") {
        return Err(McpError::invalid_params(format!("Address must start with '0x': {}", s), None));
    }

    // Check length (0x + 40 hex chars = 42 total)
    if trimmed.len() != 42 {
        return Err(McpError::invalid_params(
            format!(
                "Address must be 42 characters (0x + 40 hex chars), got {}: {}",
                trimmed.len(),
                s
            ),
            None,
        ));
    }

    // Parse the address
    trimmed.parse::<Address>().map_err(|e| {
        McpError::invalid_params(format!("Invalid address format '{}': {}", s, e), None)
    })
}

/// Validate a human-readable amount against the token's decimals.
fn validate_amount(amount: &str, token: &Token) -> Result<(), McpError> {
    let raw = parse_units(amount, token.decimals).map_err(|e| McpError::invalid_params(e, None))?;
    if raw.is_zero() {
        return Err(McpError::invalid_params("Amount must be greater than zero", None));
    }
    Ok(())
}

/// Parse an optional slippage percentage, validating the 0-50% range.
fn parse_slippage(input: Option<&str>, default: Decimal) -> Result<Decimal, McpError> {
    let slippage_tolerance = input
        .map(|s| {
            Decimal::from_str(s.trim()).map_err(|e| {
                McpError::invalid_params(format!("Invalid slippage_tolerance: {}", e), None)
            })
        })
        .transpose()?
        .unwrap_or(default);

    if slippage_tolerance < Decimal::ZERO || slippage_tolerance > Decimal::from(50) {
        return Err(McpError::invalid_params(
            "slippage_tolerance must be between 0 and 50 (percentage)",
            None,
        ));
    }
    Ok(slippage_tolerance)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))
}

#[tool_router]
impl MultichainDexServer {
    /// List the configured DEX deployments.
    #[tool(description = "List the DEX deployments this server can quote and trade on")]
    pub async fn list_dexes(&self) -> Result<String, McpError> {
        tracing::info!("list_dexes called");

        let dexes: Vec<DexSummary> = self
            .dexes
            .values()
            .map(|dex| DexSummary {
                chain_id: dex.chain_id(),
                chain: dex.chain().name.clone(),
                name: dex.name().to_string(),
                router: dex.chain().router,
                factory: dex.chain().factory,
                native_symbol: dex.chain().native.symbol.clone(),
                rpc_configured: dex.has_client(),
            })
            .collect();

        to_json(&dexes)
    }

    /// Quote a swap.
    ///
    /// Routes directly or through bridge tokens and simulates the output with the
    /// router. Wrapping and unwrapping the native coin quote 1:1.
    #[tool(
        description = "Quote a token swap on a chain's DEX. Returns expected output, price impact, route and gas estimate."
    )]
    pub async fn get_quote(
        &self,
        Parameters(input): Parameters<GetQuoteInput>,
    ) -> Result<String, McpError> {
        tracing::info!(
            chain_id = input.chain_id,
            token_in = %input.token_in,
            token_out = %input.token_out,
            amount = %input.amount,
            "get_quote called"
        );

        let dex = self.dex(input.chain_id)?;
        let (token_in, token_out) =
            self.resolve_pair(dex, &input.token_in, &input.token_out).await?;
        validate_amount(&input.amount, &token_in)?;

        let quote = dex.get_quote(&token_in, &token_out, &input.amount).await?;

        to_json(&QuoteResponse {
            chain_id: dex.chain_id(),
            dex: dex.name().to_string(),
            route_symbols: self.route_symbols(dex.chain_id(), &quote.route),
            amount_in: input.amount.trim().to_string(),
            token_in,
            token_out,
            quote,
        })
    }

    /// Find the route a swap would take.
    #[tool(
        description = "Find the swap route between two tokens: direct pair, or through wrapped native and stablecoin bridges. An empty route means no liquidity."
    )]
    pub async fn get_swap_route(
        &self,
        Parameters(input): Parameters<GetSwapRouteInput>,
    ) -> Result<String, McpError> {
        tracing::info!(
            chain_id = input.chain_id,
            token_in = %input.token_in,
            token_out = %input.token_out,
            "get_swap_route called"
        );

        let dex = self.dex(input.chain_id)?;
        let (token_in, token_out) =
            self.resolve_pair(dex, &input.token_in, &input.token_out).await?;

        let route = dex.get_swap_route(&token_in, &token_out).await?;

        to_json(&RouteResponse {
            chain_id: dex.chain_id(),
            found: !route.is_empty(),
            hops: route.hops(),
            route_symbols: self.route_symbols(dex.chain_id(), &route),
            route,
        })
    }

    /// Read a pair's reserves.
    #[tool(description = "Get the AMM pair address, reserves and LP supply for two tokens")]
    pub async fn get_pair_info(
        &self,
        Parameters(input): Parameters<GetPairInfoInput>,
    ) -> Result<String, McpError> {
        tracing::info!(
            chain_id = input.chain_id,
            token_a = %input.token_a,
            token_b = %input.token_b,
            "get_pair_info called"
        );

        let dex = self.dex(input.chain_id)?;
        let (token_a, token_b) = self.resolve_pair(dex, &input.token_a, &input.token_b).await?;

        let pair = dex.get_pair_info(&token_a, &token_b).await?;

        to_json(&PairInfoResponse { chain_id: dex.chain_id(), exists: pair.is_some(), pair })
    }

    /// Check registry membership. Unlisted tokens can still be quoted.
    #[tool(description = "Check whether a token is in the chain's token registry")]
    pub async fn is_token_supported(
        &self,
        Parameters(input): Parameters<IsTokenSupportedInput>,
    ) -> Result<String, McpError> {
        tracing::info!(
            chain_id = input.chain_id,
            token = %input.token,
            "is_token_supported called"
        );

        let dex = self.dex(input.chain_id)?;
        let trimmed = input.token.trim();

        let supported = if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
            let address = parse_address(trimmed)?;
            self.registry
                .token_by_address(dex.chain_id(), address)
                .is_some_and(|token| dex.is_token_supported(token))
        } else {
            self.registry
                .token_by_symbol(dex.chain_id(), trimmed)
                .is_some_and(|token| dex.is_token_supported(token))
        };

        to_json(&TokenSupportResponse {
            chain_id: dex.chain_id(),
            token: trimmed.to_string(),
            supported,
        })
    }

    /// Execute a token swap.
    ///
    /// Quotes first, applies slippage to the quoted output, then submits the
    /// transaction from the configured wallet. The transaction IS sent on-chain.
    #[tool(
        description = "Execute a token swap on-chain from the configured wallet. Quotes first and protects the trade with a slippage-adjusted minimum output and deadline."
    )]
    pub async fn swap_tokens(
        &self,
        Parameters(input): Parameters<SwapTokensInput>,
    ) -> Result<String, McpError> {
        tracing::info!(
            chain_id = input.chain_id,
            token_in = %input.token_in,
            token_out = %input.token_out,
            amount = %input.amount,
            slippage = ?input.slippage_tolerance,
            "swap_tokens called"
        );

        let dex = self.dex(input.chain_id)?;
        let account = self.session.require_account()?;

        let (token_in, token_out) =
            self.resolve_pair(dex, &input.token_in, &input.token_out).await?;
        validate_amount(&input.amount, &token_in)?;

        let slippage_tolerance =
            parse_slippage(input.slippage_tolerance.as_deref(), self.default_slippage)?;
        let recipient = input.recipient.as_deref().map(parse_address).transpose()?;

        let quote = dex.get_quote(&token_in, &token_out, &input.amount).await?;

        let mut params = SwapParams::from_quote(
            token_in,
            token_out,
            &input.amount,
            &quote,
            slippage_tolerance,
            self.deadline_minutes,
        )?;
        if let Some(recipient) = recipient {
            params = params.with_recipient(recipient);
        }

        let tx_hash = dex.execute_swap(&params).await?;

        let status = if input.wait_for_confirmation {
            dex.await_confirmation(tx_hash).await?
        } else {
            SwapStatus::Submitted(tx_hash)
        };

        to_json(&SwapResponse {
            chain_id: dex.chain_id(),
            tx_hash,
            from: account.address(),
            amount_in: params.amount_in,
            expected_amount_out: quote.amount_out,
            amount_out_min: params.amount_out_min,
            slippage_tolerance,
            deadline: params.deadline,
            route: params.route,
            status,
        })
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for MultichainDexServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "multichain-dex".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Multichain DEX MCP Server. Quotes, routes and executes swaps on \
                 Uniswap V2 style DEXes across several EVM chains."
                    .to_string(),
            ),
        }
    }
}
