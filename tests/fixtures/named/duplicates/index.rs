// Registers my-foo twice.
