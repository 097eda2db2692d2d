pub mod dex_programs {
    pub const JUPITER: &str = "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4";
    pub const JUPITER_DCA: &str = "DCAK36VfExkPdAkYUQg6ewgxyinvcEyPLyHjRbmveKFw";
    pub const PUMP_FUN: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";
    /// Companion entry program for the bonding curve; trade events still come from `PUMP_FUN`.
    pub const PUMP_FUN_COMPANION: &str = "BSfD6SHZigAfDWSjzD5Q41jw8LmKwtmjskPH9XW1mrRW";
    pub const PUMP_SWAP: &str = "pAMMBay6oceH9fJKBRHGP5D4bD4sWpmSwMn52FMfXEA";
    pub const MOONSHOT: &str = "MoonCVVNZFSYkqNXP6bxHLPL6QQJiMagDL3qcqUQTrG";
    pub const RAYDIUM: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";
    pub const RAYDIUM_ROUTE: &str = "routeUGWgWzqBWFcrCfv8tritsqukccJPu3q5GPP3xS";
    pub const RAYDIUM_CPMM: &str = "CPMMoo8L3F4NbTegBCKVNunggL7H1ZpdTHKxQB5qKP1C";
    pub const RAYDIUM_CLMM: &str = "CAMMCzo5YL8w4VFF8KVHrK22GGUsp5VTaW7grrKgrWqK";
    pub const RAYDIUM_LEGACY_SWAP: &str = "AP51WLiiqTdbZfgyRMs35PsZpdmLuPDdHYmrB23pEtMU";
    pub const RAYDIUM_LAUNCHPAD: &str = "LanMV9sAd7wArD4vJFi2qDdfnVhFxYSUg6eADduJ3uj";
    pub const ORCA: &str = "whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc";
    pub const METEORA: &str = "LBUZKhRxPF3XUpBCjp4YzTKgLccjZhTSDM9YuVaPwxo";
    pub const METEORA_DAMM: &str = "Eo7WjKq67rjJQSZxS6z3YkapzY3eMj6Xy8X5EQVn5UaB";
    pub const METEORA_DAMM_V2: &str = "cpamdpZCGKUy5JxQXB4dcpGPiikHawvSWAd6mEn1sGG";
    pub const OKX_DEX_ROUTER: &str = "6m2CDdhRgxpH4WjvdzxAYbGxwdGUz5MziiL5jek2kBma";
}

/// Trading-bot programs that wrap one or more DEX calls.
pub mod bot_programs {
    pub const BANANA_GUN: &str = "BANANAjs7FJiPQqJTGFzkZJndT9o7UmKiYYGaJz6frGu";
    pub const MINTECH: &str = "minTcHYRLVPubRK8nt6sqe2ZpWrGDLQoNLipDJCGocY";
    pub const BLOOM: &str = "b1oomGGqPKGD6errbyfbVMBuzSC8WtAAYo8MwNafWW1";
    pub const MAESTRO: &str = "MaestroAAe9ge5HTc64VbBQZ6fP77pwvrhM8i1XWSAx";
    pub const NOVA: &str = "NoVA1TmDUqksaj2hB1nayFkPysjJbFiU76dT4qPw2wm";

    pub const ALL: &[&str] = &[BANANA_GUN, MINTECH, BLOOM, MAESTRO, NOVA];
}

pub mod token_programs {
    pub const TOKEN: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
    pub const TOKEN_2022: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";

    pub fn is_token_program(program_id: &str) -> bool {
        program_id == TOKEN || program_id == TOKEN_2022
    }
}

pub mod discriminators {
    /// Anchor emits self-CPI events behind this 8-byte tag.
    pub const EVENT_IX_TAG: [u8; 8] = [228, 69, 165, 46, 81, 203, 154, 29];

    pub mod jupiter_events {
        pub const ROUTE: [u8; 16] = [
            228, 69, 165, 46, 81, 203, 154, 29, 64, 198, 205, 232, 38, 8, 113, 226,
        ];
    }

    pub mod pumpfun_events {
        pub const TRADE: [u8; 16] = [
            228, 69, 165, 46, 81, 203, 154, 29, 189, 219, 127, 211, 78, 230, 97, 238,
        ];
        pub const CREATE: [u8; 16] = [
            228, 69, 165, 46, 81, 203, 154, 29, 27, 114, 169, 77, 222, 235, 99, 118,
        ];
        pub const COMPLETE: [u8; 16] = [
            228, 69, 165, 46, 81, 203, 154, 29, 95, 114, 97, 156, 212, 46, 152, 8,
        ];
        pub const MIGRATE: [u8; 16] = [
            228, 69, 165, 46, 81, 203, 154, 29, 189, 233, 93, 185, 92, 148, 234, 148,
        ];
    }

    pub mod moonshot_instructions {
        pub const BUY: [u8; 8] = [102, 6, 61, 18, 1, 218, 235, 234];
        pub const SELL: [u8; 8] = [51, 230, 133, 164, 1, 127, 131, 173];
    }

    pub mod okx_instructions {
        pub const SWAP: [u8; 8] = [248, 198, 158, 145, 225, 117, 135, 200];
        pub const SWAP2: [u8; 8] = [65, 75, 63, 76, 235, 91, 91, 136];
        pub const COMMISSION_SPL_SWAP2: [u8; 8] = [173, 131, 78, 38, 150, 165, 123, 15];
        pub const SWAP3: [u8; 8] = [19, 44, 130, 148, 72, 56, 44, 238];

        pub const ALL: &[[u8; 8]] = &[SWAP, SWAP2, COMMISSION_SPL_SWAP2, SWAP3];
    }
}

pub mod spl_token_tags {
    pub const TRANSFER: u8 = 3;
    pub const TRANSFER_CHECKED: u8 = 12;
}

pub const NATIVE_SOL_DECIMALS: u8 = 9;

#[allow(non_snake_case)]
pub struct Tokens {
    pub SOL: &'static str,
    pub USDC: &'static str,
    pub USDT: &'static str,
}

pub const TOKENS: Tokens = Tokens {
    SOL: "So11111111111111111111111111111111111111112",
    USDC: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
    USDT: "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY9NQnuX2V8cZ6dk",
};
