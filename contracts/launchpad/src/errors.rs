use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    PoolAlreadyExists = 4,
    PoolNotFound = 5,
    InsufficientReserve = 6,
    InsufficientBalance = 7,
    ZeroAmount = 8,
    InvalidAmount = 9,
    NotTicketEligible = 10,
    EmptySchedule = 11,
    SizeMismatch = 12,
    PercentSumInvalid = 13,
    NothingToClaim = 14,
    FullyClaimed = 15,
    ScheduleLocked = 16,
    ScheduleNotFound = 17,
    InvalidThresholds = 18,
    InvalidPoolConfig = 19,
    Paused = 20,
    SeedNotCommitted = 21,
    SeedMismatch = 22,
    InvalidBps = 23,
    SeedAlreadyCommitted = 24,
}
