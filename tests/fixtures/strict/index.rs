// Registers /, /strict and /very-strict/.
