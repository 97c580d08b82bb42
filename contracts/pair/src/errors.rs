use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum PairError {
    AlreadyInitialized = 100,
    NotInitialized = 101,
    IdenticalTokens = 102,

    // Caller preconditions.
    WrongRecipient = 110,
    AmountOverflow = 111,
    InvalidDepositToken = 112,
    AmountNotZero = 113,
    NegativeAmount = 114,
    NoPendingDeposit = 115,
    InvalidTo = 116,

    // Economic checks.
    InsufficientLiquidityMinted = 120,
    InsufficientLiquidityBurned = 121,
    InsufficientOutputAmount = 122,
    InsufficientInputAmount = 123,
    InsufficientLiquidity = 124,
    InvalidK = 125,

    // LP token ledger.
    InsufficientBalance = 130,
    InsufficientAllowance = 131,

    TokenBalanceOverflow = 140,
    Overflow = 141,
    TransferFailed = 142,
    Locked = 150,
}
