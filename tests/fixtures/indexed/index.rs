// Index module registering /good and /subgood.
