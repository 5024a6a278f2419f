//! Wrapped-native (WETH9-style) contract bindings.
//!
//! `deposit` wraps the attached native value 1:1; `withdraw` burns the caller's own
//! wrapped balance and sends back native coin, so it needs no allowance.

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IWrappedNative {
        function deposit() external payable;
        function withdraw(uint256 wad) external;
        function balanceOf(address account) external view returns (uint256);
    }
}
