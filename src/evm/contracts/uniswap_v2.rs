//! Uniswap V2 (and fork) contract bindings.

use alloy::{
    primitives::{keccak256, Address, Bytes, U256},
    sol,
    sol_types::SolValue,
};

// Uniswap V2 Router interface
sol! {
    #[sol(rpc)]
    interface IUniswapV2Router02 {
        function factory() external pure returns (address);
        function WETH() external pure returns (address);

        function swapExactTokensForTokens(
            uint amountIn,
            uint amountOutMin,
            address[] calldata path,
            address to,
            uint deadline
        ) external returns (uint[] memory amounts);

        function swapExactETHForTokens(
            uint amountOutMin,
            address[] calldata path,
            address to,
            uint deadline
        ) external payable returns (uint[] memory amounts);

        function swapExactTokensForETH(
            uint amountIn,
            uint amountOutMin,
            address[] calldata path,
            address to,
            uint deadline
        ) external returns (uint[] memory amounts);

        function getAmountsOut(
            uint amountIn,
            address[] calldata path
        ) external view returns (uint[] memory amounts);
    }
}

// Uniswap V2 Factory interface
sol! {
    #[sol(rpc)]
    interface IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
        function allPairsLength() external view returns (uint);
    }
}

// Uniswap V2 Pair interface
sol! {
    #[sol(rpc)]
    interface IUniswapV2Pair {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function totalSupply() external view returns (uint);
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    }
}

/// First four bytes of the keccak hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Calldata for the payable native-in entry point named `function`.
///
/// Forks only rename the function, so the selector is derived from the configured name
/// and the arguments keep the `swapExactETHForTokens` layout.
pub fn encode_swap_native_in(
    function: &str,
    amount_out_min: U256,
    path: Vec<Address>,
    to: Address,
    deadline: U256,
) -> Bytes {
    let signature = format!("{function}(uint256,address[],address,uint256)");
    let mut data = selector(&signature).to_vec();
    data.extend((amount_out_min, path, to, deadline).abi_encode_params());
    data.into()
}

/// Calldata for the native-out entry point named `function`.
pub fn encode_swap_native_out(
    function: &str,
    amount_in: U256,
    amount_out_min: U256,
    path: Vec<Address>,
    to: Address,
    deadline: U256,
) -> Bytes {
    let signature = format!("{function}(uint256,uint256,address[],address,uint256)");
    let mut data = selector(&signature).to_vec();
    data.extend((amount_in, amount_out_min, path, to, deadline).abi_encode_params());
    data.into()
}
