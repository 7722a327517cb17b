// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contract bindings for both protocol generations.
//!
//! Only the functions the SDK calls are declared.

use alloy::sol;

// =============================================================================
// Protocol V1 (1.0 / 1.1 / 1.5)
// =============================================================================

sol! {
    #[sol(rpc)]
    interface ArianeeAria {
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    #[sol(rpc)]
    interface ArianeeCreditHistory {
        function balanceOf(address _spender, uint256 _type) external view returns (uint256);
    }

    #[sol(rpc)]
    interface ArianeeEvent {
        function eventIdToToken(uint256 _eventId) external view returns (uint256);
        function getEvent(uint256 _eventId) external view returns (string eventURI, bytes32 eventImprint, address eventProvider, uint256 timestamp);
    }

    #[sol(rpc)]
    interface ArianeeIdentity {
        function addressIsApproved(address _identity) external view returns (bool);
        function addressURI(address _identity) external view returns (string);
        function addressImprint(address _identity) external view returns (bytes32);
    }

    #[sol(rpc)]
    interface ArianeeSmartAsset {
        function ownerOf(uint256 _tokenId) external view returns (address);
        function getApproved(uint256 _tokenId) external view returns (address);
        function balanceOf(address _owner) external view returns (uint256);
        function tokenURI(uint256 _tokenId) external view returns (string);
        function tokenImprint(uint256 _tokenId) external view returns (bytes32);
        function tokenIssuer(uint256 _tokenId) external view returns (address);
        function approve(address _approved, uint256 _tokenId) external;
        function transferFrom(address _from, address _to, uint256 _tokenId) external;
    }

    #[sol(rpc)]
    interface ArianeeStore {
        function getCreditPrice(uint256 _creditType) external view returns (uint256);
        function buyCredit(uint256 _creditType, uint256 _quantity, address _to) external;
        function reserveToken(uint256 _id, address _to) external;
        function updateSmartAsset(uint256 _tokenId, bytes32 _imprint, address _providerBrand) external;
    }

    #[sol(rpc)]
    interface ArianeeWhitelist {
        function isAuthorized(uint256 _tokenId, address _sender, address _tokenOwner) external view returns (bool);
    }

    #[sol(rpc)]
    interface ArianeeLost {
        function isMissing(uint256 _tokenId) external view returns (bool);
        function isStolen(uint256 _tokenId) external view returns (bool);
    }

    #[sol(rpc)]
    interface ArianeeMessage {
        function messageLengthByReceiver(address _receiver) external view returns (uint256);
    }

    #[sol(rpc)]
    interface ArianeeUserAction {
        function requestToken(uint256 _tokenId, bytes32 _hash, bool _keepRequestToken, address _providerOwner, bytes _signature, address _walletProvider) external;
    }

    #[sol(rpc)]
    interface ArianeeUpdate {
        function getUpdate(uint256 _tokenId) external view returns (bytes32 imprint, uint256 updateTimestamp);
    }

    #[sol(rpc)]
    interface ArianeeIssuerProxy {
        function creditFreeSenders(address _sender) external view returns (bool);
        function commitmentHashes(uint256 _tokenId) external view returns (uint256);
    }

    #[sol(rpc)]
    interface ArianeeCreditNotePool {
        function isSpent(bytes32 _nullifierHash) external view returns (bool);
    }
}

// =============================================================================
// Protocol V2
// =============================================================================

sol! {
    #[sol(rpc)]
    interface ArianeeSmartAssetV2 {
        function ownerOf(uint256 tokenId) external view returns (address);
        function getApproved(uint256 tokenId) external view returns (address);
        function balanceOf(address owner) external view returns (uint256);
        function tokenURI(uint256 tokenId) external view returns (string);
        function issuerOf(uint256 tokenId) external view returns (address);
        function imprintOf(uint256 tokenId) external view returns (bytes32);
        function approve(address to, uint256 tokenId) external;
        function transferFrom(address from, address to, uint256 tokenId) external;
    }

    #[sol(rpc)]
    interface ArianeeOwnershipRegistry {
        function ownerOf(address nft, uint256 tokenId) external view returns (address);
    }

    #[sol(rpc)]
    interface ArianeeEventHub {
        function eventCount(address nft, uint256 tokenId) external view returns (uint256);
    }

    #[sol(rpc)]
    interface ArianeeMessageHub {
        function messageCount(address receiver) external view returns (uint256);
    }

    #[sol(rpc)]
    interface ArianeeRulesManager {
        function isAuthorized(address nft, uint256 tokenId, address account) external view returns (bool);
    }

    #[sol(rpc)]
    interface ArianeeCreditManager {
        function balanceOf(address account, uint256 creditType) external view returns (uint256);
    }
}
