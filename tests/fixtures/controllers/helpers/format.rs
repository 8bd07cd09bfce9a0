// Helper module: exports a request handler, not a mount function.
