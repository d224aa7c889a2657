//! Solidity contract ABI bindings for the USDC token and the Gateway
//! vault and minter contracts.

use alloy::sol;

sol!(
    #![sol(all_derives = true, rpc)]
    contract IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
);

sol!(
    #![sol(all_derives = true, rpc)]
    contract IGatewayWallet {
        function deposit(address token, uint256 amount) external;
    }
);

sol!(
    #![sol(all_derives = true, rpc)]
    contract IGatewayMinter {
        function gatewayMint(bytes calldata attestationPayload, bytes calldata signature) external;
    }
);
