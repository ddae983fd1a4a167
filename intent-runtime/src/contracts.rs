//! Solidity bindings for every on-chain interface the runtime touches.
//!
//! Uses alloy's `sol!` macro to generate type-safe ABI encoders/decoders for
//! the hub lending pool, the vault tokens, the asset managers, the per-user
//! routers and the intents contract.

use alloy::sol;

sol! {
    /// One call executed by a hub wallet or user router, shipped cross-chain
    /// as `(address,uint256,bytes)[]`.
    struct ContractCallData {
        address addr;
        uint256 value;
        bytes data;
    }

    #[sol(rpc)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
    }

    interface IWrappedNative {
        function deposit() external payable;
        function withdrawTo(address account, uint256 amount) external;
    }

    /// Vault token: wraps a hub asset 1:1 in value, normalized to 18 decimals.
    interface IVaultToken {
        function deposit(address token, uint256 amount) external;
        function withdraw(address token, uint256 amount) external;
    }

    interface IPool {
        function supply(address asset, uint256 amount, address onBehalfOf, uint16 referralCode) external;
        function withdraw(address asset, uint256 amount, address to) external returns (uint256);
        function borrow(address asset, uint256 amount, uint256 interestRateMode, uint16 referralCode, address onBehalfOf) external;
        function repay(address asset, uint256 amount, uint256 interestRateMode, address onBehalfOf) external returns (uint256);
        function setUserUseReserveAsCollateral(address asset, bool useAsCollateral) external;
    }

    /// Hub asset manager: releases bridged assets back to a spoke chain.
    interface IHubAssetManager {
        function transfer(address token, bytes to, uint256 amount, bytes data) external payable;
    }

    /// Spoke asset manager: locks spoke tokens and forwards the call batch to
    /// the user's hub wallet.
    interface ISpokeAssetManager {
        function transfer(address token, bytes to, uint256 amount, bytes data) external payable;
    }

    interface IConnection {
        function sendMessage(uint256 dstChainId, bytes dstAddress, bytes payload) external;
    }

    #[sol(rpc)]
    interface IWalletFactory {
        function getDeployedAddress(uint256 chainId, bytes user) external view returns (address);
    }

    interface IUserRouter {
        function route(ContractCallData[] calls) external payable;
    }

    interface IIntents {
        struct Intent {
            uint256 intentId;
            address creator;
            address inputToken;
            address outputToken;
            uint256 inputAmount;
            uint256 minOutputAmount;
            uint256 deadline;
            bool allowPartialFill;
            uint256 srcChain;
            uint256 dstChain;
            bytes srcAddress;
            bytes dstAddress;
            address solver;
            bytes data;
        }

        function createIntent(Intent intent) external;
        function cancelIntent(Intent intent) external;
    }
}
