// Fails while loading.
