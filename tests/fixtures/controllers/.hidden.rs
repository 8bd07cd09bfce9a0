// Dotfiles are never mapped.
