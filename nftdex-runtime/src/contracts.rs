//! Solidity contract bindings for the NFT DEX contract set.
//!
//! Uses alloy's `sol!` macro to generate type-safe ABI encoders/decoders for
//! `StandardNFT`, `Pair`, and `PairFactory`. Write paths build the generated
//! `…Call` structs and `abi_encode()` them — a closed, typed call set rather
//! than string-keyed dispatch.

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IStandardNFT {
        function name() external view returns (string memory);
        function symbol() external view returns (string memory);
        function totalSupply() external view returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
        function ownerOf(uint256 tokenId) external view returns (address);
        function mintPrice() external view returns (uint256);
        function maxSupply() external view returns (uint256);

        function mint(address to, string memory uri) external payable;
        function setApprovalForAll(address operator, bool approved) external;
    }

    #[sol(rpc)]
    interface IPair {
        struct TradeInfo {
            address trader;
            bool isBuy;
            uint256 price;
            uint256 timestamp;
        }

        function buyNFT(uint256 maxPrice) external payable;
        function sellNFT(uint256 tokenId, uint256 minPrice) external;
        function addLiquidity(uint256[] calldata nftTokenIds) external payable;
        function removeLiquidity(uint256 lpTokenAmount, uint256[] calldata nftTokenIds) external;
        function addInitialLiquidity(uint256[] calldata nftTokenIds) external payable;

        function getCurrentPrice() external view returns (uint256);
        function getSellPrice() external view returns (uint256);
        function getBuyQuote() external view returns (uint256 totalCost, uint256 fee);
        function getPoolReserves() external view returns (uint256 ethReserve, uint256 nftReserveCount);
        function getTradeHistory() external view returns (TradeInfo[] memory);
        function getRecentTrades(uint256 count) external view returns (TradeInfo[] memory);
        function getAccumulatedFees() external view returns (uint256);
    }

    #[sol(rpc)]
    interface IPairFactory {
        event PoolCreated(address indexed poolAddress, address indexed nftContract);

        function createPool(address nftContract) external returns (address poolAddress);
        function getPoolAddress(address nftContract) external view returns (address poolAddress);
        function getAllPools() external view returns (address[] memory);
    }
}
